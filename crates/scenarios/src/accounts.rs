//! Account reads shared by the scenario assertions.

use crate::error::ScenarioError;
use moai_protocols::rpc::{RpcProvider, TokenAccountState};
use solana_sdk::pubkey::Pubkey;

/// Token account that a step expects to exist.
pub async fn require_token_account(
    provider: &RpcProvider,
    address: &Pubkey,
    step: &str,
) -> Result<TokenAccountState, ScenarioError> {
    provider
        .get_token_account(address)
        .await?
        .ok_or_else(|| ScenarioError::assertion(step, format!("token account {address} does not exist")))
}

/// Token balance, zero when the account has not been created yet.
pub async fn token_amount_or_zero(provider: &RpcProvider, address: &Pubkey) -> Result<u64, ScenarioError> {
    Ok(provider
        .get_token_account(address)
        .await?
        .map_or(0, |account| account.amount))
}

/// `before - after`, failing `step` when the balance grew.
pub fn decrease(step: &str, what: &str, before: u64, after: u64) -> Result<u64, ScenarioError> {
    before
        .checked_sub(after)
        .ok_or_else(|| ScenarioError::assertion(step, format!("{what} grew from {before} to {after}")))
}

/// `after - before`, failing `step` when the balance shrank.
pub fn increase(step: &str, what: &str, before: u64, after: u64) -> Result<u64, ScenarioError> {
    after
        .checked_sub(before)
        .ok_or_else(|| ScenarioError::assertion(step, format!("{what} shrank from {before} to {after}")))
}
