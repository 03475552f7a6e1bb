use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    msg,
    program_error::ProgramError,
    program_pack::{IsInitialized, Sealed},
    pubkey::Pubkey,
};

use crate::custody::Custody;
use crate::events::RaffleEvent;
use crate::raffle_error::RaffleError;
use crate::utils::winner_index;
use crate::vrf::{
    RandomnessGateway, RandomnessRequest, MAX_CALLBACK_GAS_LIMIT, NUM_WORDS,
    REQUEST_CONFIRMATIONS,
};

/// Entries one raffle account can hold
pub const MAX_PLAYERS: usize = 256;

/// State of the current round
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    /// Entries accepted, upkeep may close the round
    Open,
    /// Entries rejected, waiting for randomness fulfillment
    Calculating,
}

/// Immutable per-deployment parameters
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RaffleConfig {
    /// Lamports required per entry
    pub entrance_fee: u64,
    /// Seconds between rounds
    pub interval: i64,
    /// Key hash selecting the coordinator's gas lane
    pub gas_lane: [u8; 32],
    /// Coordinator subscription paying for requests
    pub subscription_id: u64,
    /// Budget for the fulfillment callback
    pub callback_gas_limit: u32,
    /// Authority allowed to deliver random words
    pub coordinator: Pubkey,
}

impl RaffleConfig {
    pub const LEN: usize = 8 + 8 + 32 + 8 + 4 + 32;

    /// Development defaults: 0.01 SOL entry, 30 second rounds
    pub fn localnet(coordinator: Pubkey) -> Self {
        Self {
            entrance_fee: 10_000_000,
            interval: 30,
            gas_lane: [0u8; 32],
            subscription_id: 1,
            callback_gas_limit: 500_000,
            coordinator,
        }
    }

    pub fn validate(&self) -> Result<(), RaffleError> {
        if self.entrance_fee == 0 {
            msg!("Entrance fee must be greater than zero");
            return Err(RaffleError::InvalidConfig);
        }
        if self.interval <= 0 {
            msg!("Update interval must be positive");
            return Err(RaffleError::InvalidConfig);
        }
        if self.callback_gas_limit > MAX_CALLBACK_GAS_LIMIT {
            msg!(
                "Callback gas limit {} exceeds coordinator maximum {}",
                self.callback_gas_limit,
                MAX_CALLBACK_GAS_LIMIT
            );
            return Err(RaffleError::InvalidConfig);
        }
        Ok(())
    }
}

/// Read-only view of a raffle for clients
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RaffleSummary {
    pub recent_winner: Option<Pubkey>,
    pub state: RaffleState,
    pub players: Vec<Pubkey>,
    pub entrance_fee: u64,
    pub balance: u64,
    pub last_timestamp: UnixTimestamp,
    pub interval: i64,
}

/// Raffle account data
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Raffle {
    /// Is the account initialized
    pub is_initialized: bool,
    pub config: RaffleConfig,
    pub state: RaffleState,
    /// Start of the current round, or the last payout
    pub last_timestamp: UnixTimestamp,
    /// Winner of the last completed round
    pub recent_winner: Option<Pubkey>,
    /// Request awaiting fulfillment, only while calculating
    pub pending_request: Option<u64>,
    /// Number of randomness requests issued so far
    pub request_nonce: u64,
    /// One entry per paid entrance fee, in entry order
    pub players: Vec<Pubkey>,
}

impl Sealed for Raffle {}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Raffle {
    pub const LEN: usize =
        1 + RaffleConfig::LEN + 1 + 8 + (1 + 32) + (1 + 8) + 8 + (4 + 32 * MAX_PLAYERS);

    pub fn new(config: RaffleConfig, now: UnixTimestamp) -> Self {
        Self {
            is_initialized: true,
            config,
            state: RaffleState::Open,
            last_timestamp: now,
            recent_winner: None,
            pending_request: None,
            request_nonce: 0,
            players: Vec::new(),
        }
    }

    /// Decodes account data; trailing capacity is ignored
    pub fn unpack(src: &[u8]) -> Result<Self, ProgramError> {
        let mut data = src;
        Self::deserialize(&mut data).map_err(|_| ProgramError::InvalidAccountData)
    }

    pub fn pack(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        let mut data = dst;
        self.serialize(&mut data)
            .map_err(|_| ProgramError::AccountDataTooSmall)
    }

    /// Accepts one entry for `player` while the round is open
    pub fn enter<C: Custody>(
        &mut self,
        player: Pubkey,
        payment: u64,
        custody: &mut C,
    ) -> Result<RaffleEvent, ProgramError> {
        if payment < self.config.entrance_fee {
            msg!(
                "Payment of {} lamports is below the entrance fee of {}",
                payment,
                self.config.entrance_fee
            );
            return Err(RaffleError::InsufficientPayment.into());
        }
        if self.state != RaffleState::Open {
            return Err(RaffleError::RaffleNotOpen.into());
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(RaffleError::RaffleFull.into());
        }

        custody.collect(&player, payment)?;
        self.players.push(player);

        Ok(RaffleEvent::EnteredRaffle { player })
    }

    /// Succeeds iff the round is open, the interval elapsed and funds are pooled
    pub fn ensure_upkeep_needed(
        &self,
        now: UnixTimestamp,
        balance: u64,
    ) -> Result<(), RaffleError> {
        let is_open = self.state == RaffleState::Open;
        let time_passed = now.saturating_sub(self.last_timestamp) >= self.config.interval;
        let has_players = !self.players.is_empty();
        let has_balance = balance > 0;

        if is_open && time_passed && has_players && has_balance {
            Ok(())
        } else {
            Err(RaffleError::UpkeepNotNeeded {
                balance,
                num_players: self.players.len() as u64,
                state: self.state,
            })
        }
    }

    /// Read-only upkeep decision; the returned perform data is always empty
    pub fn check_upkeep(&self, now: UnixTimestamp, balance: u64) -> (bool, Vec<u8>) {
        (self.ensure_upkeep_needed(now, balance).is_ok(), Vec::new())
    }

    /// Closes entry and asks the gateway for randomness
    pub fn perform_upkeep<G: RandomnessGateway>(
        &mut self,
        now: UnixTimestamp,
        balance: u64,
        gateway: &mut G,
    ) -> Result<RaffleEvent, ProgramError> {
        if let Err(err) = self.ensure_upkeep_needed(now, balance) {
            msg!("{}", err);
            return Err(err.into());
        }

        let nonce = self
            .request_nonce
            .checked_add(1)
            .ok_or(RaffleError::ArithmeticOverflow)?;
        let request_id = gateway.request_random_words(&self.randomness_request(nonce))?;

        self.request_nonce = nonce;
        self.state = RaffleState::Calculating;
        self.pending_request = Some(request_id);

        Ok(RaffleEvent::UpkeepPerformed { request_id })
    }

    /// Picks the winner from the first random word, pays out the whole pool
    /// and reopens. On payout failure nothing changes and the round stays
    /// calculating.
    pub fn fulfill_random_words<C: Custody>(
        &mut self,
        request_id: u64,
        random_words: &[u64],
        now: UnixTimestamp,
        custody: &mut C,
    ) -> Result<RaffleEvent, ProgramError> {
        if self.pending_request != Some(request_id) {
            msg!("Nonexistent request {}", request_id);
            return Err(RaffleError::UnknownRequest.into());
        }
        let random_word = *random_words
            .first()
            .ok_or(RaffleError::InvalidInstructionData)?;

        let index = winner_index(random_word, self.players.len());
        let winner = self.players[index];
        let prize = custody.balance();

        custody.pay_out(&winner, prize)?;

        self.recent_winner = Some(winner);
        self.players.clear();
        self.state = RaffleState::Open;
        self.pending_request = None;
        self.last_timestamp = now;

        Ok(RaffleEvent::WinnerPicked { winner })
    }

    fn randomness_request(&self, nonce: u64) -> RandomnessRequest {
        RandomnessRequest {
            key_hash: self.config.gas_lane,
            subscription_id: self.config.subscription_id,
            request_confirmations: REQUEST_CONFIRMATIONS,
            callback_gas_limit: self.config.callback_gas_limit,
            num_words: NUM_WORDS,
            nonce,
        }
    }

    pub fn recent_winner(&self) -> Option<Pubkey> {
        self.recent_winner
    }

    pub fn state(&self) -> RaffleState {
        self.state
    }

    pub fn entrance_fee(&self) -> u64 {
        self.config.entrance_fee
    }

    pub fn interval(&self) -> i64 {
        self.config.interval
    }

    pub fn player(&self, index: usize) -> Option<&Pubkey> {
        self.players.get(index)
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn last_timestamp(&self) -> UnixTimestamp {
        self.last_timestamp
    }

    pub fn pending_request(&self) -> Option<u64> {
        self.pending_request
    }

    pub fn summary(&self, balance: u64) -> RaffleSummary {
        RaffleSummary {
            recent_winner: self.recent_winner,
            state: self.state,
            players: self.players.clone(),
            entrance_fee: self.config.entrance_fee,
            balance,
            last_timestamp: self.last_timestamp,
            interval: self.config.interval,
        }
    }
}
