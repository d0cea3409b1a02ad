use moai_domain::DomainError;
use solana_client::client_error::ClientError;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("RPC request failed: {0}")]
    Rpc(#[from] ClientError),
    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),
    #[error("{account} account data is too short ({len} bytes)")]
    AccountTooShort { account: &'static str, len: usize },
    #[error("Discriminator mismatch for {0} account")]
    DiscriminatorMismatch(&'static str),
    #[error("Failed to decode {account} account: {reason}")]
    Decode { account: &'static str, reason: String },
    #[error("Failed to build {instruction} instruction: {reason}")]
    InstructionBuild {
        instruction: &'static str,
        reason: String,
    },
    #[error("Failed to sign transaction: {0}")]
    Signing(String),
    #[error("Invalid value returned by RPC: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}
