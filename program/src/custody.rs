// Custody of the prize pool held by the raffle account
use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, program::invoke,
    program_error::ProgramError, pubkey::Pubkey, system_instruction,
};

use crate::raffle_error::RaffleError;
use crate::utils::custody_balance;

/// Funds held on behalf of the current round's participants.
///
/// Both movements are all-or-nothing: on error nothing has been moved.
pub trait Custody {
    /// Pool collected so far this round
    fn balance(&self) -> u64;

    /// Takes `amount` from `from` into the pool
    fn collect(&mut self, from: &Pubkey, amount: u64) -> ProgramResult;

    /// Sends `amount` from the pool to `to`
    fn pay_out(&mut self, to: &Pubkey, amount: u64) -> ProgramResult;
}

/// Lamport custody over a program-owned raffle account.
///
/// The counterparty is the player on entry and the winner on payout.
pub struct LamportVault<'a, 'b> {
    vault: &'b AccountInfo<'a>,
    counterparty: &'b AccountInfo<'a>,
    system_program: Option<&'b AccountInfo<'a>>,
    rent_minimum: u64,
}

impl<'a, 'b> LamportVault<'a, 'b> {
    pub fn new(
        vault: &'b AccountInfo<'a>,
        counterparty: &'b AccountInfo<'a>,
        system_program: Option<&'b AccountInfo<'a>>,
        rent_minimum: u64,
    ) -> Self {
        Self {
            vault,
            counterparty,
            system_program,
            rent_minimum,
        }
    }
}

impl<'a, 'b> Custody for LamportVault<'a, 'b> {
    fn balance(&self) -> u64 {
        custody_balance(self.vault.lamports(), self.rent_minimum)
    }

    fn collect(&mut self, from: &Pubkey, amount: u64) -> ProgramResult {
        if self.counterparty.key != from {
            msg!("Payment source {} is not the entering player", self.counterparty.key);
            return Err(ProgramError::InvalidArgument);
        }
        let system_program = self.system_program.ok_or(ProgramError::NotEnoughAccountKeys)?;

        invoke(
            &system_instruction::transfer(from, self.vault.key, amount),
            &[
                self.counterparty.clone(),
                self.vault.clone(),
                system_program.clone(),
            ],
        )
    }

    fn pay_out(&mut self, to: &Pubkey, amount: u64) -> ProgramResult {
        if self.counterparty.key != to {
            msg!(
                "Winner account {} does not match selected winner {}",
                self.counterparty.key,
                to
            );
            return Err(RaffleError::WinnerAccountMismatch.into());
        }
        if !self.counterparty.is_writable || self.counterparty.executable {
            msg!("Winner account {} cannot receive lamports", to);
            return Err(RaffleError::PayoutFailed.into());
        }
        if amount > self.balance() {
            msg!("Payout of {} exceeds pool of {}", amount, self.balance());
            return Err(RaffleError::PayoutFailed.into());
        }

        let vault_lamports = self
            .vault
            .lamports()
            .checked_sub(amount)
            .ok_or(RaffleError::PayoutFailed)?;
        let winner_lamports = self
            .counterparty
            .lamports()
            .checked_add(amount)
            .ok_or(RaffleError::PayoutFailed)?;

        **self.vault.try_borrow_mut_lamports()? = vault_lamports;
        **self.counterparty.try_borrow_mut_lamports()? = winner_lamports;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pay_out_moves_pool_to_winner() {
        let program_id = Pubkey::new_unique();
        let system_id = solana_program::system_program::id();
        let vault_key = Pubkey::new_unique();
        let winner_key = Pubkey::new_unique();
        let mut vault_lamports = 1_000 + 40;
        let mut winner_lamports = 5;
        let mut vault_data = vec![0u8; 8];
        let mut winner_data = vec![0u8; 0];
        let vault = AccountInfo::new(
            &vault_key,
            false,
            true,
            &mut vault_lamports,
            &mut vault_data,
            &program_id,
            false,
            0,
        );
        let winner = AccountInfo::new(
            &winner_key,
            false,
            true,
            &mut winner_lamports,
            &mut winner_data,
            &system_id,
            false,
            0,
        );

        let mut custody = LamportVault::new(&vault, &winner, None, 1_000);
        assert_eq!(custody.balance(), 40);
        custody.pay_out(&winner_key, 40).unwrap();
        assert_eq!(custody.balance(), 0);
        assert_eq!(vault.lamports(), 1_000);
        assert_eq!(winner.lamports(), 45);
    }

    #[test]
    fn pay_out_rejects_wrong_or_readonly_winner() {
        let program_id = Pubkey::new_unique();
        let system_id = solana_program::system_program::id();
        let vault_key = Pubkey::new_unique();
        let winner_key = Pubkey::new_unique();
        let mut vault_lamports = 1_010;
        let mut winner_lamports = 0;
        let mut vault_data = vec![0u8; 0];
        let mut winner_data = vec![0u8; 0];
        let vault = AccountInfo::new(
            &vault_key,
            false,
            true,
            &mut vault_lamports,
            &mut vault_data,
            &program_id,
            false,
            0,
        );
        let readonly_winner = AccountInfo::new(
            &winner_key,
            false,
            false,
            &mut winner_lamports,
            &mut winner_data,
            &system_id,
            false,
            0,
        );

        let mut custody = LamportVault::new(&vault, &readonly_winner, None, 1_000);
        assert_eq!(
            custody.pay_out(&Pubkey::new_unique(), 10),
            Err(RaffleError::WinnerAccountMismatch.into())
        );
        assert_eq!(
            custody.pay_out(&winner_key, 10),
            Err(RaffleError::PayoutFailed.into())
        );
        assert_eq!(vault.lamports(), 1_010);
    }
}
