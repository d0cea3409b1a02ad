//! Well-known program and sysvar addresses.

use solana_sdk::pubkey::Pubkey;

/// Moai program deployed by the workspace.
pub const MOAI_PROGRAM_ID: Pubkey = Pubkey::from_str_const("2Svk2fb1YwpjKrxktUabBsYYm49HiXyxHpAAAK5g6K9t");

/// Proxy program forwarding calls to the Whirlpool program.
pub const WHIRLPOOL_PROXY_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("8bd9cEM4gmXkUBe31rs1Virzk5DnC1je13RqDWufwXdm");

/// Orca Whirlpool program.
pub const WHIRLPOOL_PROGRAM_ID: Pubkey = Pubkey::from_str_const("whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc");

/// Whirlpools config cloned into the local validator.
pub const WHIRLPOOLS_CONFIG: Pubkey = Pubkey::from_str_const("2LecshUwdy9xi7meFgHtFJQNSKk4KdTrcpvaB56dP2NQ");

pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey::from_str_const("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = spl_associated_token_account_interface::program::ID;

pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::from_str_const("11111111111111111111111111111111");

pub const MEMO_PROGRAM_ID: Pubkey = Pubkey::from_str_const("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

pub const RENT_SYSVAR_ID: Pubkey = Pubkey::from_str_const("SysvarRent111111111111111111111111111111111");

/// Wrapped SOL mint.
pub const NATIVE_MINT: Pubkey = Pubkey::from_str_const("So11111111111111111111111111111111111111112");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_ids_match_spl() {
        assert_eq!(TOKEN_PROGRAM_ID, spl_token::id());
        assert_eq!(NATIVE_MINT, spl_token::native_mint::id());
        assert_eq!(
            ASSOCIATED_TOKEN_PROGRAM_ID.to_string(),
            "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"
        );
        assert_eq!(SYSTEM_PROGRAM_ID, solana_system_interface::program::id());
        assert_eq!(RENT_SYSVAR_ID, solana_sdk::sysvar::rent::id());
    }

    #[test]
    fn test_native_mint_matches_domain() {
        assert_eq!(NATIVE_MINT.to_string(), moai_domain::token::NATIVE_MINT);
    }
}
