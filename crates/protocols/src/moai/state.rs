use crate::anchor::AnchorAccount;
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

/// Global state of one Moai instance.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct Moai {
    pub authority: Pubkey,
    pub current_top_vote: Option<Pubkey>,
    pub epoch: u64,
    /// wSOL account holding ROCK sale proceeds.
    pub escrow_account: Pubkey,
    pub moai_mint_account: Pubkey,
    pub rock_mint_account: Pubkey,
    /// Bump of the Moai PDA.
    pub nonce: u8,
    pub mutable: bool,
}

impl AnchorAccount for Moai {
    const DISCRIMINATOR: [u8; 8] = [45, 163, 110, 28, 251, 212, 222, 170];
    const NAME: &'static str = "Moai";
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct Meme {
    pub name: String,
    pub uri: String,
    pub creator: Pubkey,
}

impl AnchorAccount for Meme {
    const DISCRIMINATOR: [u8; 8] = [232, 224, 0, 147, 187, 194, 135, 26];
    const NAME: &'static str = "Meme";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::encode_account;

    #[test]
    fn test_moai_layout() {
        let moai = Moai {
            authority: Pubkey::new_unique(),
            current_top_vote: None,
            epoch: 0,
            escrow_account: Pubkey::new_unique(),
            moai_mint_account: Pubkey::new_unique(),
            rock_mint_account: Pubkey::new_unique(),
            nonce: 254,
            mutable: true,
        };
        let data = encode_account(&moai, 0);
        // disc + authority + option tag + epoch + 3 keys + nonce + mutable
        assert_eq!(data.len(), 8 + 32 + 1 + 8 + 96 + 1 + 1);
        assert_eq!(data[40], 0);
        assert_eq!(Moai::try_from_account_data(&data).unwrap(), moai);
    }

    #[test]
    fn test_moai_with_top_vote_and_padding() {
        let moai = Moai {
            authority: Pubkey::new_unique(),
            current_top_vote: Some(Pubkey::new_unique()),
            epoch: 3,
            escrow_account: Pubkey::new_unique(),
            moai_mint_account: Pubkey::new_unique(),
            rock_mint_account: Pubkey::new_unique(),
            nonce: 1,
            mutable: false,
        };
        let data = encode_account(&moai, 32);
        assert_eq!(Moai::try_from_account_data(&data).unwrap(), moai);
    }

    #[test]
    fn test_meme_allocated_space() {
        let meme = Meme {
            name: "moai".to_string(),
            uri: "https://gateway.irys.xyz/abc".to_string(),
            creator: Pubkey::new_unique(),
        };
        // the program allocates 4 + 32 + 4 + 100 + 32 bytes after the discriminator
        let used = borsh::to_vec(&meme).unwrap().len();
        let data = encode_account(&meme, 172 - used);
        assert_eq!(data.len(), 8 + 172);
        assert_eq!(Meme::try_from_account_data(&data).unwrap(), meme);
    }

    #[test]
    fn test_wrong_account_type() {
        let meme = Meme {
            name: String::new(),
            uri: String::new(),
            creator: Pubkey::default(),
        };
        let data = encode_account(&meme, 200);
        assert!(Moai::try_from_account_data(&data).is_err());
    }
}
