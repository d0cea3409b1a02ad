//! Anchor account and instruction framing.
//!
//! Instruction data is an 8-byte discriminator followed by the Borsh encoded
//! arguments. Account data starts with the account discriminator; the rest is
//! Borsh, possibly followed by zero padding up to the allocated size.

use crate::AccountFetcher;
use crate::error::ProtocolError;
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

pub const DISCRIMINATOR_LEN: usize = 8;

/// An account owned by an Anchor program.
pub trait AnchorAccount: BorshDeserialize {
    /// `sha256("account:<Name>")[..8]`
    const DISCRIMINATOR: [u8; 8];
    const NAME: &'static str;

    /// Decodes account data, ignoring trailing bytes.
    fn try_from_account_data(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(ProtocolError::AccountTooShort {
                account: Self::NAME,
                len: data.len(),
            });
        }
        if data[..DISCRIMINATOR_LEN] != Self::DISCRIMINATOR {
            return Err(ProtocolError::DiscriminatorMismatch(Self::NAME));
        }
        let mut body = &data[DISCRIMINATOR_LEN..];
        Self::deserialize(&mut body).map_err(|e| ProtocolError::Decode {
            account: Self::NAME,
            reason: e.to_string(),
        })
    }
}

/// Fetches and decodes an Anchor account, failing when it does not exist.
pub async fn fetch_account<T: AnchorAccount, F: AccountFetcher + ?Sized>(
    fetcher: &F,
    address: &Pubkey,
) -> Result<T, ProtocolError> {
    let data = fetcher
        .fetch_account_data(address)
        .await?
        .ok_or(ProtocolError::AccountNotFound(*address))?;
    T::try_from_account_data(&data)
}

/// Fetches and decodes an Anchor account that may not exist yet.
pub async fn fetch_account_opt<T: AnchorAccount, F: AccountFetcher + ?Sized>(
    fetcher: &F,
    address: &Pubkey,
) -> Result<Option<T>, ProtocolError> {
    match fetcher.fetch_account_data(address).await? {
        Some(data) => T::try_from_account_data(&data).map(Some),
        None => Ok(None),
    }
}

/// Builds instruction data from a discriminator and Borsh encoded arguments.
pub fn instruction_data<T: BorshSerialize>(
    instruction: &'static str,
    discriminator: [u8; 8],
    args: &T,
) -> Result<Vec<u8>, ProtocolError> {
    let encoded = borsh::to_vec(args).map_err(|e| ProtocolError::InstructionBuild {
        instruction,
        reason: e.to_string(),
    })?;
    let mut data = Vec::with_capacity(DISCRIMINATOR_LEN + encoded.len());
    data.extend_from_slice(&discriminator);
    data.extend_from_slice(&encoded);
    Ok(data)
}

/// Encodes an account the way the program stores it. Test helper.
#[cfg(test)]
pub(crate) fn encode_account<T: AnchorAccount + BorshSerialize>(account: &T, padding: usize) -> Vec<u8> {
    let mut data = T::DISCRIMINATOR.to_vec();
    data.extend(borsh::to_vec(account).unwrap());
    data.extend(std::iter::repeat_n(0u8, padding));
    data
}
