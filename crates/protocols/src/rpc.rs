//! RPC access for the harness.
//!
//! [`RpcProvider`] wraps the non-blocking client with the commitment level and
//! send options every scenario shares, and converts the parsed token responses
//! into plain values.

use crate::AccountFetcher;
use crate::error::ProtocolError;
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_client::rpc_response::RpcSimulateTransactionResult;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Signature, Signer},
    transaction::Transaction,
};
use std::str::FromStr;
use tracing::{debug, info};

/// Default local validator endpoint.
pub const LOCALNET_URL: &str = "http://127.0.0.1:8899";

/// RPC connection settings.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// JSON RPC endpoint.
    pub url: String,
    /// Commitment used for reads and confirmations.
    pub commitment: CommitmentConfig,
    /// Skips the preflight simulation when sending.
    pub skip_preflight: bool,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: LOCALNET_URL.to_string(),
            commitment: CommitmentConfig::confirmed(),
            skip_preflight: false,
        }
    }
}

/// Token account fields the scenarios assert on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountState {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    pub delegated_amount: u64,
}

/// Shared RPC client.
pub struct RpcProvider {
    client: RpcClient,
    config: RpcConfig,
}

impl RpcProvider {
    pub fn new(config: RpcConfig) -> Self {
        let client = RpcClient::new_with_commitment(config.url.clone(), config.commitment);
        Self { client, config }
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// The underlying client, for calls the provider does not wrap.
    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    pub async fn get_latest_blockhash(&self) -> Result<Hash, ProtocolError> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    pub async fn get_slot(&self) -> Result<u64, ProtocolError> {
        Ok(self.client.get_slot().await?)
    }

    /// Lamport balance of `address`.
    pub async fn get_balance(&self, address: &Pubkey) -> Result<u64, ProtocolError> {
        Ok(self.client.get_balance(address).await?)
    }

    /// Raw account data, `None` when the account does not exist.
    pub async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ProtocolError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.config.commitment)
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    pub async fn get_minimum_balance_for_rent_exemption(&self, len: usize) -> Result<u64, ProtocolError> {
        Ok(self.client.get_minimum_balance_for_rent_exemption(len).await?)
    }

    /// Raw amount held by a token account.
    pub async fn get_token_balance(&self, token_account: &Pubkey) -> Result<u64, ProtocolError> {
        let balance = self.client.get_token_account_balance(token_account).await?;
        parse_amount(&balance.amount)
    }

    /// Token account snapshot, `None` when the account does not exist.
    pub async fn get_token_account(
        &self,
        token_account: &Pubkey,
    ) -> Result<Option<TokenAccountState>, ProtocolError> {
        let Some(account) = self.client.get_token_account(token_account).await? else {
            return Ok(None);
        };

        let delegate = account.delegate.as_deref().map(parse_pubkey).transpose()?;
        let delegated_amount = match &account.delegated_amount {
            Some(amount) => parse_amount(&amount.amount)?,
            None => 0,
        };

        Ok(Some(TokenAccountState {
            mint: parse_pubkey(&account.mint)?,
            owner: parse_pubkey(&account.owner)?,
            amount: parse_amount(&account.token_amount.amount)?,
            delegate,
            delegated_amount,
        }))
    }

    /// Decimals of a mint.
    pub async fn get_mint_decimals(&self, mint: &Pubkey) -> Result<u8, ProtocolError> {
        Ok(self.client.get_token_supply(mint).await?.decimals)
    }

    /// Requests an airdrop and waits until it is confirmed.
    pub async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> Result<Signature, ProtocolError> {
        info!(to = %to, lamports, "Requesting airdrop");
        let signature = self.client.request_airdrop(to, lamports).await?;
        self.client
            .poll_for_signature_with_commitment(&signature, self.config.commitment)
            .await?;
        Ok(signature)
    }

    /// Signs `instructions` with `payer` and `signers` and sends them in one
    /// transaction.
    pub async fn send_instructions(
        &self,
        instructions: &[Instruction],
        payer: &dyn Signer,
        signers: &[&dyn Signer],
    ) -> Result<Signature, ProtocolError> {
        let transaction = self.sign_transaction(instructions, payer, signers).await?;
        self.send_and_confirm_transaction(&transaction).await
    }

    /// Builds a transaction with a fresh blockhash.
    pub async fn sign_transaction(
        &self,
        instructions: &[Instruction],
        payer: &dyn Signer,
        signers: &[&dyn Signer],
    ) -> Result<Transaction, ProtocolError> {
        let recent_blockhash = self.get_latest_blockhash().await?;
        build_signed_transaction(instructions, payer, signers, recent_blockhash)
    }

    pub async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, ProtocolError> {
        debug!(
            instructions = transaction.message.instructions.len(),
            skip_preflight = self.config.skip_preflight,
            "Sending transaction"
        );

        let send_config = RpcSendTransactionConfig {
            skip_preflight: self.config.skip_preflight,
            preflight_commitment: Some(self.config.commitment.commitment),
            ..RpcSendTransactionConfig::default()
        };
        let signature = self
            .client
            .send_and_confirm_transaction_with_spinner_and_config(
                transaction,
                self.config.commitment,
                send_config,
            )
            .await?;

        debug!(signature = %signature, "Transaction confirmed");
        Ok(signature)
    }

    pub async fn simulate_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<RpcSimulateTransactionResult, ProtocolError> {
        Ok(self.client.simulate_transaction(transaction).await?.value)
    }
}

#[async_trait]
impl AccountFetcher for RpcProvider {
    async fn fetch_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ProtocolError> {
        self.get_account_data(address).await
    }
}

/// Builds and signs a legacy transaction paid by `payer`. Signers whose key
/// already appears earlier in the list are skipped.
pub fn build_signed_transaction(
    instructions: &[Instruction],
    payer: &dyn Signer,
    signers: &[&dyn Signer],
    recent_blockhash: Hash,
) -> Result<Transaction, ProtocolError> {
    let mut all_signers: Vec<&dyn Signer> = vec![payer];
    for signer in signers {
        if !all_signers.iter().any(|s| s.pubkey() == signer.pubkey()) {
            all_signers.push(*signer);
        }
    }

    let payer_key = payer.pubkey();
    let mut transaction = Transaction::new_with_payer(instructions, Some(&payer_key));
    transaction
        .try_sign(&all_signers, recent_blockhash)
        .map_err(|e| ProtocolError::Signing(e.to_string()))?;
    Ok(transaction)
}

fn parse_amount(amount: &str) -> Result<u64, ProtocolError> {
    amount
        .parse()
        .map_err(|_| ProtocolError::InvalidResponse(format!("token amount {amount}")))
}

fn parse_pubkey(address: &str) -> Result<Pubkey, ProtocolError> {
    Pubkey::from_str(address).map_err(|_| ProtocolError::InvalidResponse(format!("address {address}")))
}
