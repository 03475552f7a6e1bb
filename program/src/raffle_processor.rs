use crate::custody::{Custody, LamportVault};
use crate::raffle_error::RaffleError;
use crate::raffle_instruction::RaffleInstruction;
use crate::raffle_state::{Raffle, RaffleConfig};
use crate::utils::{custody_balance, lamports_to_sol};
use crate::vrf::CoordinatorGateway;

use borsh::BorshSerialize;
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, set_return_data},
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::InitializeRaffle { config } => {
                msg!("Instruction: Initialize Raffle");
                Self::process_initialize_raffle(accounts, config, program_id)
            }
            RaffleInstruction::EnterRaffle { amount } => {
                msg!("Instruction: Enter Raffle");
                Self::process_enter_raffle(accounts, amount, program_id)
            }
            RaffleInstruction::CheckUpkeep { .. } => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(accounts, program_id)
            }
            RaffleInstruction::PerformUpkeep { .. } => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(accounts, program_id)
            }
            RaffleInstruction::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill Random Words");
                Self::process_fulfill_random_words(accounts, request_id, &random_words, program_id)
            }
        }
    }

    fn process_initialize_raffle(
        accounts: &[AccountInfo],
        config: RaffleConfig,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer {
            msg!("Payer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        // A pre-assigned account must still be claimed by its own key
        if !raffle_info.is_signer {
            msg!("Raffle account must sign its initialization");
            return Err(ProgramError::MissingRequiredSignature);
        }

        config.validate()?;

        if raffle_info.owner == program_id {
            if raffle_info.data_len() < Raffle::LEN {
                msg!("Raffle account needs {} bytes", Raffle::LEN);
                return Err(ProgramError::AccountDataTooSmall);
            }
            let existing = Raffle::unpack(&raffle_info.data.borrow())?;
            if existing.is_initialized() {
                msg!("Raffle account is already initialized");
                return Err(RaffleError::AlreadyInitialized.into());
            }
        } else {
            let rent = Rent::get()?;
            invoke(
                &system_instruction::create_account(
                    payer_info.key,
                    raffle_info.key,
                    rent.minimum_balance(Raffle::LEN),
                    Raffle::LEN as u64,
                    program_id,
                ),
                &[
                    payer_info.clone(),
                    raffle_info.clone(),
                    system_program_info.clone(),
                ],
            )?;
        }

        let now = Clock::get()?.unix_timestamp;
        let raffle = Raffle::new(config, now);
        raffle.pack(&mut raffle_info.data.borrow_mut())?;

        msg!(
            "Raffle initialized: EntranceFee={} SOL, Interval={}s, Coordinator={}",
            lamports_to_sol(raffle.entrance_fee()),
            raffle.interval(),
            raffle.config.coordinator
        );
        Ok(())
    }

    fn process_enter_raffle(
        accounts: &[AccountInfo],
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(raffle_info, program_id)?;
        let mut vault = LamportVault::new(
            raffle_info,
            player_info,
            Some(system_program_info),
            Self::rent_minimum(raffle_info)?,
        );

        let event = raffle.enter(*player_info.key, amount, &mut vault)?;
        raffle.pack(&mut raffle_info.data.borrow_mut())?;
        event.emit()?;

        msg!(
            "Entered with {} lamports, {} players in round",
            amount,
            raffle.num_players()
        );
        Ok(())
    }

    fn process_check_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        let raffle = Self::load_raffle(raffle_info, program_id)?;
        let balance = custody_balance(raffle_info.lamports(), Self::rent_minimum(raffle_info)?);
        let now = Clock::get()?.unix_timestamp;

        let (upkeep_needed, perform_data) = raffle.check_upkeep(now, balance);
        let result = (upkeep_needed, perform_data)
            .try_to_vec()
            .map_err(|_| ProgramError::InvalidAccountData)?;
        set_return_data(&result);

        msg!("Upkeep needed: {}", upkeep_needed);
        Ok(())
    }

    fn process_perform_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        // Anyone can perform upkeep; conditions are re-checked below
        if !caller_info.is_signer {
            msg!("Caller must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(raffle_info, program_id)?;
        let balance = custody_balance(raffle_info.lamports(), Self::rent_minimum(raffle_info)?);
        let now = Clock::get()?.unix_timestamp;

        let mut gateway = CoordinatorGateway::new(raffle_info.key);
        let event = raffle.perform_upkeep(now, balance, &mut gateway)?;
        raffle.pack(&mut raffle_info.data.borrow_mut())?;
        event.emit()?;

        msg!(
            "Round closed with {} players and {} lamports",
            raffle.num_players(),
            balance
        );
        Ok(())
    }

    fn process_fulfill_random_words(
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: &[u64],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let coordinator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        let mut raffle = Self::load_raffle(raffle_info, program_id)?;

        if !coordinator_info.is_signer || *coordinator_info.key != raffle.config.coordinator {
            msg!("Only coordinator {} may fulfill", raffle.config.coordinator);
            return Err(RaffleError::NotCoordinator.into());
        }

        let now = Clock::get()?.unix_timestamp;
        let mut vault =
            LamportVault::new(raffle_info, winner_info, None, Self::rent_minimum(raffle_info)?);
        let prize = vault.balance();

        let event = raffle.fulfill_random_words(request_id, random_words, now, &mut vault)?;
        raffle.pack(&mut raffle_info.data.borrow_mut())?;
        event.emit()?;

        msg!("Paid {} lamports to {}", prize, winner_info.key);
        Ok(())
    }

    fn load_raffle(raffle_info: &AccountInfo, program_id: &Pubkey) -> Result<Raffle, ProgramError> {
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by the program");
            return Err(ProgramError::IncorrectProgramId);
        }
        let raffle = Raffle::unpack(&raffle_info.data.borrow())?;
        if !raffle.is_initialized() {
            return Err(ProgramError::UninitializedAccount);
        }
        Ok(raffle)
    }

    fn rent_minimum(raffle_info: &AccountInfo) -> Result<u64, ProgramError> {
        Ok(Rent::get()?.minimum_balance(raffle_info.data_len()))
    }
}
