use solana_sdk::pubkey::Pubkey;

pub const MOAI_SEED: &[u8] = b"moai";
pub const MEME_SEED: &[u8] = b"meme";
pub const VOTE_SEED: &[u8] = b"vote";
pub const USER_INFO_SEED: &[u8] = b"user";

/// Moai state account of `authority`. Also the mint and escrow authority.
pub fn moai_address(program_id: &Pubkey, authority: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[MOAI_SEED, authority.as_ref()], program_id)
}

/// Meme account for the meme `index`.
pub fn meme_address(program_id: &Pubkey, index: &str) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[MEME_SEED, index.as_bytes()], program_id)
}

/// Vote record of a spending wallet for a meme.
pub fn vote_address(program_id: &Pubkey, user_spending: &Pubkey, meme: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VOTE_SEED, user_spending.as_ref(), meme.as_ref()], program_id)
}

/// Per-user info of a spending wallet under a Moai instance.
pub fn user_info_address(program_id: &Pubkey, moai: &Pubkey, user_spending: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[USER_INFO_SEED, moai.as_ref(), user_spending.as_ref()], program_id)
}
