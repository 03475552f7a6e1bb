use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

use crate::raffle_state::RaffleState;

/// Errors that may be returned by the raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstructionData,

    /// Payment was below the configured entrance fee
    #[error("Payment is below the entrance fee")]
    InsufficientPayment,

    /// Entries are only accepted while the raffle is open
    #[error("Raffle is not open")]
    RaffleNotOpen,

    /// Upkeep conditions did not hold when upkeep was performed
    #[error("Upkeep not needed (balance: {balance}, players: {num_players}, state: {state:?})")]
    UpkeepNotNeeded {
        balance: u64,
        num_players: u64,
        state: RaffleState,
    },

    /// Fulfillment for a request that was never issued or was already consumed
    #[error("Nonexistent randomness request")]
    UnknownRequest,

    /// Prize transfer to the winner was rejected
    #[error("Prize payout failed")]
    PayoutFailed,

    /// Configuration values are out of range
    #[error("Invalid raffle configuration")]
    InvalidConfig,

    /// Raffle account already holds a raffle
    #[error("Raffle already initialized")]
    AlreadyInitialized,

    /// Participant capacity of the raffle account is exhausted
    #[error("Raffle is full")]
    RaffleFull,

    /// Only the configured coordinator may deliver randomness
    #[error("Signer is not the randomness coordinator")]
    NotCoordinator,

    /// Account passed as winner is not the selected participant
    #[error("Winner account does not match the selected participant")]
    WinnerAccountMismatch,

    /// Coordinator refused the randomness request parameters
    #[error("Randomness request rejected")]
    RequestRejected,

    /// Checked arithmetic overflowed
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl RaffleError {
    /// Stable custom error code reported through `ProgramError::Custom`
    pub fn code(&self) -> u32 {
        match self {
            RaffleError::InvalidInstructionData => 0,
            RaffleError::InsufficientPayment => 1,
            RaffleError::RaffleNotOpen => 2,
            RaffleError::UpkeepNotNeeded { .. } => 3,
            RaffleError::UnknownRequest => 4,
            RaffleError::PayoutFailed => 5,
            RaffleError::InvalidConfig => 6,
            RaffleError::AlreadyInitialized => 7,
            RaffleError::RaffleFull => 8,
            RaffleError::NotCoordinator => 9,
            RaffleError::WinnerAccountMismatch => 10,
            RaffleError::RequestRejected => 11,
            RaffleError::ArithmeticOverflow => 12,
        }
    }
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e.code())
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Error"
    }
}

impl PrintProgramError for RaffleError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
