use super::pda;
use crate::anchor::instruction_data;
use crate::error::ProtocolError;
use crate::programs::{
    ASSOCIATED_TOKEN_PROGRAM_ID, MEMO_PROGRAM_ID, NATIVE_MINT, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID,
    TOKEN_PROGRAM_ID,
};
use crate::spl::get_associated_token_address;
use borsh::BorshSerialize;
use moai_domain::meme::MemeMetadata;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

pub const INITIALIZE_MOAI_DISCRIMINATOR: [u8; 8] = [65, 121, 72, 106, 74, 197, 116, 63];
pub const MINT_ROCK_DISCRIMINATOR: [u8; 8] = [108, 205, 201, 52, 133, 119, 33, 242];
pub const CREATE_MEME_DISCRIMINATOR: [u8; 8] = [0, 44, 207, 61, 251, 247, 167, 214];

#[derive(BorshSerialize)]
struct MintRockArgs {
    amount: u64,
}

#[derive(BorshSerialize)]
struct CreateMemeArgs<'a> {
    index: &'a str,
    name: &'a str,
    uri: &'a str,
}

/// Accounts of `initialize_moai`.
#[derive(Debug, Clone, Copy)]
pub struct InitializeMoaiAccounts {
    pub authority: Pubkey,
    pub moai: Pubkey,
    /// wSOL associated account of the Moai PDA.
    pub escrow_account: Pubkey,
    /// Fresh keypair, signs.
    pub moai_mint: Pubkey,
    /// Fresh keypair, signs.
    pub rock_mint: Pubkey,
}

impl InitializeMoaiAccounts {
    /// Derives the Moai PDA and escrow account of `authority`.
    pub fn derive(program_id: &Pubkey, authority: Pubkey, moai_mint: Pubkey, rock_mint: Pubkey) -> Self {
        let (moai, _) = pda::moai_address(program_id, &authority);
        Self {
            authority,
            moai,
            escrow_account: get_associated_token_address(&moai, &NATIVE_MINT),
            moai_mint,
            rock_mint,
        }
    }
}

/// Accounts of `mint_rock`.
#[derive(Debug, Clone, Copy)]
pub struct MintRockAccounts {
    pub user: Pubkey,
    /// Receives the fee and the ROCK delegation.
    pub user_spending: Pubkey,
    pub moai: Pubkey,
    pub rock_mint: Pubkey,
    /// ROCK associated account of `user`.
    pub user_rock_account: Pubkey,
    pub escrow_account: Pubkey,
}

impl MintRockAccounts {
    pub fn new(user: Pubkey, user_spending: Pubkey, moai: Pubkey, rock_mint: Pubkey, escrow_account: Pubkey) -> Self {
        Self {
            user,
            user_spending,
            moai,
            rock_mint,
            user_rock_account: get_associated_token_address(&user, &rock_mint),
            escrow_account,
        }
    }
}

pub fn initialize_moai(program_id: &Pubkey, accounts: &InitializeMoaiAccounts) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(accounts.authority, true),                    // authority
            AccountMeta::new(accounts.moai, false),                        // moai
            AccountMeta::new(accounts.escrow_account, false),              // escrow_account
            AccountMeta::new_readonly(NATIVE_MINT, false),                 // wsol_mint
            AccountMeta::new(accounts.moai_mint, true),                    // moai_mint
            AccountMeta::new(accounts.rock_mint, true),                    // rock_mint
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),            // token_program
            AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false), // associated_token_program
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),           // system_program
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),              // rent
        ],
        data: INITIALIZE_MOAI_DISCRIMINATOR.to_vec(),
    }
}

pub fn mint_rock(
    program_id: &Pubkey,
    accounts: &MintRockAccounts,
    amount: u64,
) -> Result<Instruction, ProtocolError> {
    let data = instruction_data("mint_rock", MINT_ROCK_DISCRIMINATOR, &MintRockArgs { amount })?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(accounts.user, true),                         // user
            AccountMeta::new(accounts.user_spending, true),                // user_spending
            AccountMeta::new_readonly(accounts.moai, false),               // moai
            AccountMeta::new(accounts.rock_mint, false),                   // rock_mint
            AccountMeta::new(accounts.user_rock_account, false),           // user_rock_account
            AccountMeta::new(accounts.escrow_account, false),              // escrow_account
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),            // token_program
            AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false), // associated_token_program
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),           // system_program
            AccountMeta::new_readonly(MEMO_PROGRAM_ID, false),             // memo_program
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),              // rent
        ],
        data,
    })
}

/// Builds `create_meme`. The metadata is validated against the account limits
/// first so oversized values fail before reaching the validator.
pub fn create_meme(
    program_id: &Pubkey,
    user: &Pubkey,
    meme: &MemeMetadata,
) -> Result<Instruction, ProtocolError> {
    meme.validate()?;
    let (meme_account, _) = pda::meme_address(program_id, &meme.index);
    let args = CreateMemeArgs {
        index: &meme.index,
        name: &meme.name,
        uri: &meme.uri,
    };
    let data = instruction_data("create_meme", CREATE_MEME_DISCRIMINATOR, &args)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*user, true),                       // user
            AccountMeta::new(meme_account, false),               // meme
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false), // system_program
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),    // rent
        ],
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::MOAI_PROGRAM_ID;

    #[test]
    fn test_initialize_moai() {
        let authority = Pubkey::new_unique();
        let accounts =
            InitializeMoaiAccounts::derive(&MOAI_PROGRAM_ID, authority, Pubkey::new_unique(), Pubkey::new_unique());
        let ix = initialize_moai(&MOAI_PROGRAM_ID, &accounts);

        assert_eq!(ix.data, INITIALIZE_MOAI_DISCRIMINATOR.to_vec());
        assert_eq!(ix.accounts.len(), 10);
        assert_eq!(ix.accounts[1].pubkey, pda::moai_address(&MOAI_PROGRAM_ID, &authority).0);
        assert_eq!(
            ix.accounts[2].pubkey,
            get_associated_token_address(&accounts.moai, &NATIVE_MINT)
        );
        let signers: Vec<_> = ix.accounts.iter().filter(|m| m.is_signer).map(|m| m.pubkey).collect();
        assert_eq!(signers, vec![authority, accounts.moai_mint, accounts.rock_mint]);
    }

    #[test]
    fn test_mint_rock() {
        let user = Pubkey::new_unique();
        let spending = Pubkey::new_unique();
        let rock_mint = Pubkey::new_unique();
        let accounts = MintRockAccounts::new(user, spending, Pubkey::new_unique(), rock_mint, Pubkey::new_unique());
        let ix = mint_rock(&MOAI_PROGRAM_ID, &accounts, 19).unwrap();

        assert_eq!(&ix.data[..8], &MINT_ROCK_DISCRIMINATOR);
        assert_eq!(&ix.data[8..], &19u64.to_le_bytes());
        assert_eq!(ix.accounts.len(), 11);
        assert!(ix.accounts[0].is_signer && ix.accounts[1].is_signer);
        assert!(!ix.accounts[2].is_writable);
        assert_eq!(ix.accounts[4].pubkey, get_associated_token_address(&user, &rock_mint));
        assert_eq!(ix.accounts[9].pubkey, MEMO_PROGRAM_ID);
    }

    #[test]
    fn test_create_meme() {
        let user = Pubkey::new_unique();
        let meme = MemeMetadata::new("7", "moai", "uri").unwrap();
        let ix = create_meme(&MOAI_PROGRAM_ID, &user, &meme).unwrap();

        let mut expected = CREATE_MEME_DISCRIMINATOR.to_vec();
        for value in ["7", "moai", "uri"] {
            expected.extend_from_slice(&(value.len() as u32).to_le_bytes());
            expected.extend_from_slice(value.as_bytes());
        }
        assert_eq!(ix.data, expected);
        assert_eq!(ix.accounts[1].pubkey, pda::meme_address(&MOAI_PROGRAM_ID, "7").0);
    }

    #[test]
    fn test_create_meme_rejects_long_name() {
        let meme = MemeMetadata {
            index: "1".to_string(),
            name: "x".repeat(40),
            uri: String::new(),
        };
        assert!(matches!(
            create_meme(&MOAI_PROGRAM_ID, &Pubkey::new_unique(), &meme),
            Err(ProtocolError::Domain(_))
        ));
    }
}
