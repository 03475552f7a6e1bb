// Randomness gateway: request side of the verifiable randomness coordinator
use arrayref::array_ref;
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{hash::hashv, msg, program_error::ProgramError, pubkey::Pubkey};

use crate::events::RandomWordsRequested;
use crate::raffle_error::RaffleError;

/// Block confirmations the coordinator waits before answering
pub const REQUEST_CONFIRMATIONS: u16 = 3;
/// Random words asked for per round; only the first one is consumed
pub const NUM_WORDS: u32 = 1;

pub const MIN_REQUEST_CONFIRMATIONS: u16 = 3;
pub const MAX_REQUEST_CONFIRMATIONS: u16 = 200;
pub const MAX_CALLBACK_GAS_LIMIT: u32 = 2_500_000;
pub const MAX_NUM_WORDS: u32 = 500;

/// Parameters of a single randomness request
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RandomnessRequest {
    /// Gas lane selector
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
    /// Per-consumer request counter, makes every request id unique
    pub nonce: u64,
}

impl RandomnessRequest {
    /// Rejects parameters the coordinator would refuse to serve.
    ///
    /// Subscription funding and consumer registration live with the
    /// off-chain coordinator, which drops requests it cannot bill. Id 0 never
    /// names a created subscription and is refused here.
    pub fn validate(&self) -> Result<(), RaffleError> {
        if self.subscription_id == 0 {
            msg!("Randomness subscription is not set");
            return Err(RaffleError::RequestRejected);
        }
        if self.request_confirmations < MIN_REQUEST_CONFIRMATIONS
            || self.request_confirmations > MAX_REQUEST_CONFIRMATIONS
        {
            msg!(
                "Request confirmations {} outside [{}, {}]",
                self.request_confirmations,
                MIN_REQUEST_CONFIRMATIONS,
                MAX_REQUEST_CONFIRMATIONS
            );
            return Err(RaffleError::RequestRejected);
        }
        if self.callback_gas_limit > MAX_CALLBACK_GAS_LIMIT {
            msg!(
                "Callback gas limit {} above maximum {}",
                self.callback_gas_limit,
                MAX_CALLBACK_GAS_LIMIT
            );
            return Err(RaffleError::RequestRejected);
        }
        if self.num_words == 0 || self.num_words > MAX_NUM_WORDS {
            msg!("Cannot request {} random words", self.num_words);
            return Err(RaffleError::RequestRejected);
        }
        Ok(())
    }
}

/// Issues randomness requests on behalf of the raffle.
///
/// Fulfillment is not part of this trait: it arrives later as an independent
/// instruction carrying the request id and the random words.
pub trait RandomnessGateway {
    fn request_random_words(&mut self, request: &RandomnessRequest) -> Result<u64, ProgramError>;
}

/// Gateway backed by an off-chain coordinator that watches the program logs
pub struct CoordinatorGateway<'a> {
    consumer: &'a Pubkey,
}

impl<'a> CoordinatorGateway<'a> {
    pub fn new(consumer: &'a Pubkey) -> Self {
        Self { consumer }
    }
}

impl<'a> RandomnessGateway for CoordinatorGateway<'a> {
    fn request_random_words(&mut self, request: &RandomnessRequest) -> Result<u64, ProgramError> {
        request.validate()?;

        let request_id = derive_request_id(
            &request.key_hash,
            self.consumer,
            request.subscription_id,
            request.nonce,
        );

        RandomWordsRequested {
            request_id,
            key_hash: request.key_hash,
            subscription_id: request.subscription_id,
            request_confirmations: request.request_confirmations,
            callback_gas_limit: request.callback_gas_limit,
            num_words: request.num_words,
            consumer: *self.consumer,
        }
        .emit()?;

        Ok(request_id)
    }
}

/// Request id derived from the gas lane, consumer, subscription and nonce
pub fn derive_request_id(
    key_hash: &[u8; 32],
    consumer: &Pubkey,
    subscription_id: u64,
    nonce: u64,
) -> u64 {
    let hash = hashv(&[
        &key_hash[..],
        consumer.as_ref(),
        &subscription_id.to_le_bytes(),
        &nonce.to_le_bytes(),
    ]);
    let bytes = hash.to_bytes();
    u64::from_le_bytes(*array_ref![bytes, 0, 8])
}
