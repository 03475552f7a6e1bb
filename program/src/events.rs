// Raffle events, published as borsh-encoded program data logs for indexers
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    entrypoint::ProgramResult, log::sol_log_data, msg, program_error::ProgramError,
    pubkey::Pubkey,
};

/// Observable outcome of a state machine operation
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum RaffleEvent {
    /// A participant joined the current round
    EnteredRaffle { player: Pubkey },
    /// Entry closed and randomness was requested
    UpkeepPerformed { request_id: u64 },
    /// The pool was paid out and a new round opened
    WinnerPicked { winner: Pubkey },
}

impl RaffleEvent {
    pub fn emit(&self) -> ProgramResult {
        match self {
            RaffleEvent::EnteredRaffle { player } => msg!("EnteredRaffle: {}", player),
            RaffleEvent::UpkeepPerformed { request_id } => {
                msg!("UpkeepPerformed: request {}", request_id)
            }
            RaffleEvent::WinnerPicked { winner } => msg!("WinnerPicked: {}", winner),
        }
        log_borsh(self)
    }
}

/// Request record the off-chain coordinator watches for
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RandomWordsRequested {
    pub request_id: u64,
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
    pub consumer: Pubkey,
}

impl RandomWordsRequested {
    pub fn emit(&self) -> ProgramResult {
        msg!(
            "RandomWordsRequested: request {} for consumer {}",
            self.request_id,
            self.consumer
        );
        log_borsh(self)
    }
}

fn log_borsh<T: BorshSerialize>(value: &T) -> ProgramResult {
    let data = value
        .try_to_vec()
        .map_err(|_| ProgramError::InvalidAccountData)?;
    sol_log_data(&[data.as_slice()]);
    Ok(())
}
