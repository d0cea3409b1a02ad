//! Moai executor for on-chain operations.
//!
//! Sends the Moai program instructions and reads back its accounts:
//! - Initialize a Moai instance with fresh MOAI and ROCK mints
//! - Mint ROCK for SOL
//! - Create memes

use super::instructions::{self, InitializeMoaiAccounts, MintRockAccounts};
use super::pda;
use super::state::{Meme, Moai};
use crate::anchor::{fetch_account, fetch_account_opt};
use crate::error::ProtocolError;
use crate::rpc::RpcProvider;
use moai_domain::meme::MemeMetadata;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Signature, Signer},
};
use std::sync::Arc;
use tracing::info;

/// Executor for Moai program operations.
pub struct MoaiExecutor {
    /// RPC provider for blockchain interaction.
    provider: Arc<RpcProvider>,
    /// Moai program ID.
    program_id: Pubkey,
}

impl MoaiExecutor {
    pub fn new(provider: Arc<RpcProvider>, program_id: Pubkey) -> Self {
        Self {
            provider,
            program_id,
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Moai PDA of `authority`.
    pub fn moai_address(&self, authority: &Pubkey) -> Pubkey {
        pda::moai_address(&self.program_id, authority).0
    }

    /// Meme PDA for `index`.
    pub fn meme_address(&self, index: &str) -> Pubkey {
        pda::meme_address(&self.program_id, index).0
    }

    /// Initializes the Moai instance of `authority`. Both mint keypairs must
    /// be fresh.
    pub async fn initialize(
        &self,
        authority: &dyn Signer,
        moai_mint: &dyn Signer,
        rock_mint: &dyn Signer,
    ) -> Result<(InitializeMoaiAccounts, Signature), ProtocolError> {
        let accounts = InitializeMoaiAccounts::derive(
            &self.program_id,
            authority.pubkey(),
            moai_mint.pubkey(),
            rock_mint.pubkey(),
        );
        info!(
            moai = %accounts.moai,
            moai_mint = %accounts.moai_mint,
            rock_mint = %accounts.rock_mint,
            "Initializing moai"
        );

        let ix = instructions::initialize_moai(&self.program_id, &accounts);
        let signature = self
            .provider
            .send_instructions(&[ix], authority, &[moai_mint, rock_mint])
            .await?;
        info!(signature = %signature, "Moai initialized");
        Ok((accounts, signature))
    }

    /// Buys `amount` ROCK for `user`, delegating it to `user_spending`.
    pub async fn mint_rock(
        &self,
        user: &dyn Signer,
        user_spending: &dyn Signer,
        moai: &Moai,
        moai_address: &Pubkey,
        amount: u64,
    ) -> Result<(MintRockAccounts, Signature), ProtocolError> {
        let accounts = MintRockAccounts::new(
            user.pubkey(),
            user_spending.pubkey(),
            *moai_address,
            moai.rock_mint_account,
            moai.escrow_account,
        );
        info!(
            user = %accounts.user,
            user_spending = %accounts.user_spending,
            amount,
            "Minting rock"
        );

        let ix = instructions::mint_rock(&self.program_id, &accounts, amount)?;
        let signature = self
            .provider
            .send_instructions(&[ix], user, &[user_spending])
            .await?;
        info!(signature = %signature, "Rock minted");
        Ok((accounts, signature))
    }

    pub async fn create_meme(
        &self,
        user: &dyn Signer,
        meme: &MemeMetadata,
    ) -> Result<(Pubkey, Signature), ProtocolError> {
        let ix = instructions::create_meme(&self.program_id, &user.pubkey(), meme)?;
        let address = self.meme_address(&meme.index);
        info!(meme = %address, index = %meme.index, name = %meme.name, "Creating meme");

        let signature = self.provider.send_instructions(&[ix], user, &[]).await?;
        Ok((address, signature))
    }

    pub async fn fetch_moai(&self, address: &Pubkey) -> Result<Moai, ProtocolError> {
        fetch_account(self.provider.as_ref(), address).await
    }

    /// Moai state of `authority`, `None` before initialization.
    pub async fn find_moai(&self, authority: &Pubkey) -> Result<Option<Moai>, ProtocolError> {
        fetch_account_opt(self.provider.as_ref(), &self.moai_address(authority)).await
    }

    pub async fn fetch_meme(&self, index: &str) -> Result<Meme, ProtocolError> {
        fetch_account(self.provider.as_ref(), &self.meme_address(index)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::MOAI_PROGRAM_ID;
    use crate::rpc::RpcConfig;

    #[test]
    fn test_executor_addresses() {
        let provider = Arc::new(RpcProvider::new(RpcConfig::default()));
        let executor = MoaiExecutor::new(provider, MOAI_PROGRAM_ID);
        let authority = Pubkey::new_unique();

        assert_eq!(executor.program_id(), &MOAI_PROGRAM_ID);
        assert_eq!(
            executor.moai_address(&authority),
            pda::moai_address(&MOAI_PROGRAM_ID, &authority).0
        );
        assert_eq!(executor.meme_address("1"), pda::meme_address(&MOAI_PROGRAM_ID, "1").0);
    }
}
