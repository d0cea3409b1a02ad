//! On-chain program adapters for the Moai harness.
//!
//! Each adapter owns the addresses, instruction builders and account
//! decoders of one program. Account reads go through [`AccountFetcher`] so
//! decoders can be exercised without a validator.

pub mod anchor;
pub mod error;
pub mod moai;
pub mod orca; // Whirlpools proxy
pub mod programs;
pub mod rpc;
pub mod spl;

pub use error::ProtocolError;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// Returns the raw data of `address`, or `None` when the account does not exist.
    async fn fetch_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ProtocolError>;
}

/// Commonly used types.
pub mod prelude {
    pub use crate::AccountFetcher;
    pub use crate::anchor::AnchorAccount;
    pub use crate::error::ProtocolError;
    pub use crate::moai::{Meme, Moai, MoaiExecutor};
    pub use crate::orca::{Position, Tick, TickArray, Whirlpool, WhirlpoolReader};
    pub use crate::rpc::{RpcConfig, RpcProvider, TokenAccountState};
}
