//! SPL token helpers: associated accounts, mints and wrapped SOL.

use crate::error::ProtocolError;
use crate::programs::{NATIVE_MINT, TOKEN_PROGRAM_ID};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use solana_system_interface::instruction as system_instruction;
use spl_associated_token_account_interface as associated_token;
use spl_token::instruction as token_instruction;

/// Size of a mint account.
pub const MINT_LEN: usize = 82;
/// Size of a token account.
pub const TOKEN_ACCOUNT_LEN: usize = 165;

/// Associated token account of `owner` for `mint`. `owner` may be a PDA.
pub fn get_associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    associated_token::address::get_associated_token_address_with_program_id(owner, mint, &TOKEN_PROGRAM_ID)
}

/// Creates the associated token account unless it already exists.
pub fn create_associated_token_account_idempotent(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Instruction {
    associated_token::instruction::create_associated_token_account_idempotent(
        payer,
        owner,
        mint,
        &TOKEN_PROGRAM_ID,
    )
}

/// Allocates and initializes a mint whose mint and freeze authority is
/// `authority`. `rent_lamports` must cover [`MINT_LEN`].
pub fn create_mint(
    payer: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
    decimals: u8,
    rent_lamports: u64,
) -> Result<Vec<Instruction>, ProtocolError> {
    let create = system_instruction::create_account(
        payer,
        mint,
        rent_lamports,
        MINT_LEN as u64,
        &TOKEN_PROGRAM_ID,
    );
    let initialize =
        token_instruction::initialize_mint2(&TOKEN_PROGRAM_ID, mint, authority, Some(authority), decimals)
            .map_err(|e| token_error("initialize_mint2", e))?;
    Ok(vec![create, initialize])
}

pub fn mint_to(
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProtocolError> {
    token_instruction::mint_to(&TOKEN_PROGRAM_ID, mint, destination, authority, &[], amount)
        .map_err(|e| token_error("mint_to", e))
}

/// Wraps `lamports` into the wSOL associated account of `owner`, creating it
/// when needed.
pub fn wrap_sol(payer: &Pubkey, owner: &Pubkey, lamports: u64) -> Result<Vec<Instruction>, ProtocolError> {
    let ata = get_associated_token_address(owner, &NATIVE_MINT);
    let sync = token_instruction::sync_native(&TOKEN_PROGRAM_ID, &ata)
        .map_err(|e| token_error("sync_native", e))?;
    Ok(vec![
        create_associated_token_account_idempotent(payer, owner, &NATIVE_MINT),
        system_instruction::transfer(owner, &ata, lamports),
        sync,
    ])
}

pub fn transfer_checked(
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Instruction, ProtocolError> {
    token_instruction::transfer_checked(
        &TOKEN_PROGRAM_ID,
        source,
        mint,
        destination,
        authority,
        &[],
        amount,
        decimals,
    )
    .map_err(|e| token_error("transfer_checked", e))
}

fn token_error(instruction: &'static str, error: impl ToString) -> ProtocolError {
    ProtocolError::InstructionBuild {
        instruction,
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::{ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID};

    #[test]
    fn test_associated_token_address_is_deterministic() {
        let owner = Pubkey::new_unique();
        let a = get_associated_token_address(&owner, &NATIVE_MINT);
        let b = get_associated_token_address(&owner, &NATIVE_MINT);
        assert_eq!(a, b);
        assert_ne!(a, get_associated_token_address(&Pubkey::new_unique(), &NATIVE_MINT));

        let (derived, _bump) = Pubkey::find_program_address(
            &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), NATIVE_MINT.as_ref()],
            &ASSOCIATED_TOKEN_PROGRAM_ID,
        );
        assert_eq!(a, derived);
    }

    #[test]
    fn test_create_ata_idempotent_layout() {
        let payer = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ix = create_associated_token_account_idempotent(&payer, &owner, &mint);

        assert_eq!(ix.program_id, ASSOCIATED_TOKEN_PROGRAM_ID);
        assert_eq!(ix.data, vec![1]);
        assert_eq!(ix.accounts.len(), 6);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[1].pubkey, get_associated_token_address(&owner, &mint));
        assert!(ix.accounts[1].is_writable);
        assert_eq!(ix.accounts[2].pubkey, owner);
        assert_eq!(ix.accounts[3].pubkey, mint);
        assert_eq!(ix.accounts[4].pubkey, SYSTEM_PROGRAM_ID);
        assert_eq!(ix.accounts[5].pubkey, TOKEN_PROGRAM_ID);
    }

    #[test]
    fn test_create_mint() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ixs = create_mint(&payer, &mint, &payer, 9, 1_461_600).unwrap();
        assert_eq!(ixs.len(), 2);
        assert_eq!(ixs[0].program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(ixs[1].program_id, TOKEN_PROGRAM_ID);
        assert_eq!(ixs[1].accounts[0].pubkey, mint);
    }

    #[test]
    fn test_wrap_sol() {
        let payer = Pubkey::new_unique();
        let ixs = wrap_sol(&payer, &payer, 1_000).unwrap();
        let ata = get_associated_token_address(&payer, &NATIVE_MINT);
        assert_eq!(ixs.len(), 3);
        assert_eq!(ixs[0].program_id, ASSOCIATED_TOKEN_PROGRAM_ID);
        assert_eq!(ixs[1].accounts[1].pubkey, ata);
        assert_eq!(ixs[2].accounts[0].pubkey, ata);
    }
}
