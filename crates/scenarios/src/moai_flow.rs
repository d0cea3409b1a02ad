//! Moai program scenario.
//!
//! Steps, in order:
//! 1. `initialize_moai` with fresh MOAI and ROCK mints (skipped when the
//!    wallet already owns a Moai account)
//! 2. fund a fresh ROCK buyer from the wallet
//! 3. create the ROCK account of a receiver
//! 4. `mint_rock`, which wraps the price into the escrow, pays the spending
//!    wallet and delegates the minted ROCK to it
//! 5. move ROCK with the spending wallet's delegation
//! 6. `create_meme` (skipped when the meme index is taken)

use crate::accounts::{increase, require_token_account};
use crate::config::MoaiScenarioConfig;
use crate::error::{ScenarioError, ScenarioFailure, ensure_eq};
use crate::report::ScenarioReport;
use crate::transaction::TransactionBuilder;
use crate::wallet::Wallet;
use moai_domain::rock::{MOAI_DECIMALS, ROCK_DECIMALS, RockPurchase};
use moai_protocols::moai::{Meme, Moai, MoaiExecutor, pda};
use moai_protocols::programs::NATIVE_MINT;
use moai_protocols::rpc::{RpcProvider, TokenAccountState};
use moai_protocols::spl;
use serde::Serialize;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use solana_system_interface::instruction as system_instruction;
use std::sync::Arc;
use tracing::info;

const INITIALIZE_MOAI: &str = "initialize moai";
const FUND_USER: &str = "fund user";
const CREATE_RECEIVER: &str = "create receiver account";
const MINT_ROCK: &str = "mint rock";
const CHECK_APPROVE: &str = "check approve";
const CREATE_MEME: &str = "create meme";

/// Addresses touched by a Moai run.
#[derive(Debug, Clone, Serialize)]
pub struct MoaiFlowOutcome {
    pub report: ScenarioReport,
    pub moai: Pubkey,
    pub moai_mint: Pubkey,
    pub rock_mint: Pubkey,
    pub escrow: Pubkey,
    /// ROCK buyer.
    pub user: Pubkey,
    /// Spending wallet holding the ROCK delegation.
    pub user_spending: Pubkey,
    /// Receiver of the delegated transfer.
    pub receiver: Pubkey,
    pub meme: Pubkey,
}

/// Expected state of a Moai account.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedMoai {
    pub authority: Pubkey,
    pub escrow_account: Pubkey,
    pub nonce: u8,
    /// Mints the account was initialized with, when this run created it.
    pub mints: Option<(Pubkey, Pubkey)>,
}

/// Checks a Moai account against what `initialize_moai` writes.
pub fn verify_moai(moai: &Moai, expected: &ExpectedMoai) -> Result<(), ScenarioError> {
    let step = INITIALIZE_MOAI;
    ensure_eq(step, "authority", expected.authority, moai.authority)?;
    ensure_eq(step, "escrow account", expected.escrow_account, moai.escrow_account)?;
    ensure_eq(step, "nonce", expected.nonce, moai.nonce)?;
    if let Some((moai_mint, rock_mint)) = expected.mints {
        ensure_eq(step, "moai mint", moai_mint, moai.moai_mint_account)?;
        ensure_eq(step, "rock mint", rock_mint, moai.rock_mint_account)?;
        ensure_eq(step, "current top vote", None, moai.current_top_vote)?;
        ensure_eq(step, "epoch", 0, moai.epoch)?;
        ensure_eq(step, "mutable", true, moai.mutable)?;
    }
    Ok(())
}

/// Checks the buyer's ROCK account after a purchase of `amount`, with
/// `delegated` still spendable by `user_spending`.
pub fn verify_rock_account(
    step: &str,
    account: &TokenAccountState,
    user: &Pubkey,
    user_spending: &Pubkey,
    amount: u64,
    delegated: u64,
) -> Result<(), ScenarioError> {
    ensure_eq(step, "rock owner", *user, account.owner)?;
    ensure_eq(step, "rock balance", amount, account.amount)?;
    ensure_eq(step, "rock delegate", Some(*user_spending), account.delegate)?;
    ensure_eq(step, "delegated amount", delegated, account.delegated_amount)
}

pub fn verify_meme(meme: &Meme, expected_name: &str, expected_uri: &str) -> Result<(), ScenarioError> {
    ensure_eq(CREATE_MEME, "meme name", expected_name, meme.name.as_str())?;
    ensure_eq(CREATE_MEME, "meme uri", expected_uri, meme.uri.as_str())
}

/// Runs the Moai scenario with the wallet as Moai authority.
pub struct MoaiFlow<'a> {
    provider: Arc<RpcProvider>,
    executor: MoaiExecutor,
    wallet: &'a Wallet,
    config: MoaiScenarioConfig,
}

impl<'a> MoaiFlow<'a> {
    pub fn new(
        provider: Arc<RpcProvider>,
        wallet: &'a Wallet,
        program_id: Pubkey,
        config: MoaiScenarioConfig,
    ) -> Self {
        Self {
            executor: MoaiExecutor::new(provider.clone(), program_id),
            provider,
            wallet,
            config,
        }
    }

    /// Runs every step. On failure the returned report ends with the failed
    /// step.
    pub async fn run(&self) -> Result<MoaiFlowOutcome, ScenarioFailure> {
        let mut report = ScenarioReport::new("moai");
        info!(authority = %self.wallet.pubkey(), "Running moai scenario");
        self.run_steps(&mut report).await.map_err(|error| report.fail(error))
    }

    async fn run_steps(&self, report: &mut ScenarioReport) -> Result<MoaiFlowOutcome, ScenarioError> {
        let (moai_address, moai) = self
            .initialize(report)
            .await
            .map_err(|e| e.in_step(INITIALIZE_MOAI))?;

        let user = Keypair::new();
        let user_spending = Keypair::new();
        let receiver = Keypair::new().pubkey();

        self.fund_user(report, &user).await.map_err(|e| e.in_step(FUND_USER))?;
        let receiver_rock = self
            .create_receiver(report, &receiver, &moai)
            .await
            .map_err(|e| e.in_step(CREATE_RECEIVER))?;
        let user_rock = self
            .mint_rock(report, &user, &user_spending, &moai, &moai_address)
            .await
            .map_err(|e| e.in_step(MINT_ROCK))?;
        self.check_approve(report, &user, &user_spending, &moai, &user_rock, &receiver_rock)
            .await
            .map_err(|e| e.in_step(CHECK_APPROVE))?;
        let meme = self.create_meme(report).await.map_err(|e| e.in_step(CREATE_MEME))?;

        report.finish();
        Ok(MoaiFlowOutcome {
            report: std::mem::take(report),
            moai: moai_address,
            moai_mint: moai.moai_mint_account,
            rock_mint: moai.rock_mint_account,
            escrow: moai.escrow_account,
            user: user.pubkey(),
            user_spending: user_spending.pubkey(),
            receiver,
            meme,
        })
    }

    async fn initialize(&self, report: &mut ScenarioReport) -> Result<(Pubkey, Moai), ScenarioError> {
        let authority = self.wallet.keypair();
        let (moai_address, nonce) = pda::moai_address(self.executor.program_id(), &authority.pubkey());
        let mut expected = ExpectedMoai {
            authority: authority.pubkey(),
            escrow_account: spl::get_associated_token_address(&moai_address, &NATIVE_MINT),
            nonce,
            mints: None,
        };

        let (moai, signature) = match self.executor.find_moai(&authority.pubkey()).await? {
            Some(moai) => {
                info!(moai = %moai_address, "Moai already initialized");
                (moai, None)
            }
            None => {
                let moai_mint = Keypair::new();
                let rock_mint = Keypair::new();
                let (_, signature) = self.executor.initialize(authority, &moai_mint, &rock_mint).await?;
                expected.mints = Some((moai_mint.pubkey(), rock_mint.pubkey()));
                (self.executor.fetch_moai(&moai_address).await?, Some(signature))
            }
        };

        verify_moai(&moai, &expected)?;
        self.verify_mint_decimals(&moai).await?;
        match signature {
            Some(signature) => report.passed(INITIALIZE_MOAI, Some(signature), moai_address.to_string()),
            None => report.skipped(INITIALIZE_MOAI, format!("{moai_address} already exists")),
        }
        Ok((moai_address, moai))
    }

    async fn fund_user(&self, report: &mut ScenarioReport, user: &Keypair) -> Result<(), ScenarioError> {
        let authority = self.wallet.keypair();
        let result = TransactionBuilder::new(FUND_USER, authority)
            .add_instruction(system_instruction::transfer(
                &authority.pubkey(),
                &user.pubkey(),
                self.config.user_funding_lamports,
            ))
            .execute(&self.provider)
            .await?;
        let user_balance = self.provider.get_balance(&user.pubkey()).await?;
        ensure_eq(FUND_USER, "user lamports", self.config.user_funding_lamports, user_balance)?;
        report.passed(
            FUND_USER,
            Some(result.signature),
            format!("{} funded with {user_balance} lamports", user.pubkey()),
        );
        Ok(())
    }

    async fn create_receiver(
        &self,
        report: &mut ScenarioReport,
        receiver: &Pubkey,
        moai: &Moai,
    ) -> Result<Pubkey, ScenarioError> {
        let authority = self.wallet.keypair();
        let receiver_rock = spl::get_associated_token_address(receiver, &moai.rock_mint_account);
        let result = TransactionBuilder::new(CREATE_RECEIVER, authority)
            .add_instruction(spl::create_associated_token_account_idempotent(
                &authority.pubkey(),
                receiver,
                &moai.rock_mint_account,
            ))
            .execute(&self.provider)
            .await?;
        let receiver_account = require_token_account(&self.provider, &receiver_rock, CREATE_RECEIVER).await?;
        ensure_eq(CREATE_RECEIVER, "receiver balance", 0, receiver_account.amount)?;
        report.passed(CREATE_RECEIVER, Some(result.signature), receiver_rock.to_string());
        Ok(receiver_rock)
    }

    async fn verify_mint_decimals(&self, moai: &Moai) -> Result<(), ScenarioError> {
        let rock = self.provider.get_mint_decimals(&moai.rock_mint_account).await?;
        ensure_eq(INITIALIZE_MOAI, "rock decimals", ROCK_DECIMALS, rock)?;
        let moai_decimals = self.provider.get_mint_decimals(&moai.moai_mint_account).await?;
        ensure_eq(INITIALIZE_MOAI, "moai decimals", MOAI_DECIMALS, moai_decimals)
    }

    async fn mint_rock(
        &self,
        report: &mut ScenarioReport,
        user: &Keypair,
        user_spending: &Keypair,
        moai: &Moai,
        moai_address: &Pubkey,
    ) -> Result<Pubkey, ScenarioError> {
        let purchase = RockPurchase::new(self.config.rock_amount)?;
        let escrow_before = self.provider.get_token_balance(&moai.escrow_account).await?;

        let (accounts, signature) = self
            .executor
            .mint_rock(user, user_spending, moai, moai_address, purchase.amount)
            .await?;

        let rock_account = require_token_account(&self.provider, &accounts.user_rock_account, MINT_ROCK).await?;
        verify_rock_account(
            MINT_ROCK,
            &rock_account,
            &user.pubkey(),
            &user_spending.pubkey(),
            purchase.amount,
            purchase.amount,
        )?;

        let escrow_after = self.provider.get_token_balance(&moai.escrow_account).await?;
        let escrow_delta = increase(MINT_ROCK, "escrow balance", escrow_before, escrow_after)?;
        ensure_eq(MINT_ROCK, "escrow delta", purchase.escrow_lamports, escrow_delta)?;

        let spending = self.provider.get_balance(&user_spending.pubkey()).await?;
        ensure_eq(MINT_ROCK, "spending wallet lamports", purchase.fee_lamports, spending)?;

        info!(
            amount = purchase.amount,
            escrow_delta,
            spending,
            "Rock purchase verified"
        );
        report.passed(MINT_ROCK, Some(signature), purchase.memo(user_spending.pubkey()));
        Ok(accounts.user_rock_account)
    }

    async fn check_approve(
        &self,
        report: &mut ScenarioReport,
        user: &Keypair,
        user_spending: &Keypair,
        moai: &Moai,
        user_rock: &Pubkey,
        receiver_rock: &Pubkey,
    ) -> Result<(), ScenarioError> {
        let amount = self.config.delegated_transfer_amount;
        let spending_before = self.provider.get_balance(&user_spending.pubkey()).await?;

        let ix = spl::transfer_checked(
            user_rock,
            &moai.rock_mint_account,
            receiver_rock,
            &user_spending.pubkey(),
            amount,
            ROCK_DECIMALS,
        )?;
        let result = TransactionBuilder::new(CHECK_APPROVE, user_spending)
            .add_instruction(ix)
            .execute(&self.provider)
            .await?;

        let remaining = self.config.rock_amount.checked_sub(amount).ok_or_else(|| {
            ScenarioError::assertion(CHECK_APPROVE, format!("cannot move {amount} of {} rock", self.config.rock_amount))
        })?;
        let rock_account = require_token_account(&self.provider, user_rock, CHECK_APPROVE).await?;
        verify_rock_account(
            CHECK_APPROVE,
            &rock_account,
            &user.pubkey(),
            &user_spending.pubkey(),
            remaining,
            remaining,
        )?;

        let receiver = require_token_account(&self.provider, receiver_rock, CHECK_APPROVE).await?;
        ensure_eq(CHECK_APPROVE, "receiver balance", amount, receiver.amount)?;

        // the spending wallet paid the network fee
        let spending_after = self.provider.get_balance(&user_spending.pubkey()).await?;
        if spending_after >= spending_before {
            return Err(ScenarioError::assertion(
                CHECK_APPROVE,
                format!("spending wallet did not pay a fee ({spending_before} -> {spending_after})"),
            ));
        }

        report.passed(
            CHECK_APPROVE,
            Some(result.signature),
            format!("moved {amount} rock, {remaining} still delegated"),
        );
        Ok(())
    }

    async fn create_meme(&self, report: &mut ScenarioReport) -> Result<Pubkey, ScenarioError> {
        let metadata = &self.config.meme;
        let address = self.executor.meme_address(&metadata.index);

        if self.provider.get_account_data(&address).await?.is_some() {
            info!(meme = %address, index = %metadata.index, "Meme already exists");
            report.skipped(CREATE_MEME, format!("meme {} already exists", metadata.index));
            return Ok(address);
        }

        let creator = self.wallet.keypair();
        let (address, signature) = self.executor.create_meme(creator, metadata).await?;
        let meme = self.executor.fetch_meme(&metadata.index).await?;
        verify_meme(&meme, &metadata.name, &metadata.uri)?;
        ensure_eq(CREATE_MEME, "meme creator", creator.pubkey(), meme.creator)?;

        report.passed(CREATE_MEME, Some(signature), format!("{} at {address}", metadata.name));
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_moai(authority: Pubkey) -> (Moai, ExpectedMoai) {
        let escrow = Pubkey::new_unique();
        let moai_mint = Pubkey::new_unique();
        let rock_mint = Pubkey::new_unique();
        let moai = Moai {
            authority,
            current_top_vote: None,
            epoch: 0,
            escrow_account: escrow,
            moai_mint_account: moai_mint,
            rock_mint_account: rock_mint,
            nonce: 254,
            mutable: true,
        };
        let expected = ExpectedMoai {
            authority,
            escrow_account: escrow,
            nonce: 254,
            mints: Some((moai_mint, rock_mint)),
        };
        (moai, expected)
    }

    #[test]
    fn test_verify_fresh_moai() {
        let (moai, expected) = sample_moai(Pubkey::new_unique());
        assert!(verify_moai(&moai, &expected).is_ok());

        let mut voted = moai.clone();
        voted.current_top_vote = Some(Pubkey::new_unique());
        assert!(verify_moai(&voted, &expected).is_err());
    }

    #[test]
    fn test_verify_existing_moai_ignores_mints() {
        let (mut moai, mut expected) = sample_moai(Pubkey::new_unique());
        expected.mints = None;
        moai.epoch = 3;
        moai.rock_mint_account = Pubkey::new_unique();
        assert!(verify_moai(&moai, &expected).is_ok());

        moai.nonce = 1;
        let err = verify_moai(&moai, &expected).unwrap_err();
        assert_eq!(err.to_string(), "Step 'initialize moai' failed: nonce: expected 254, got 1");
    }

    #[test]
    fn test_verify_rock_account() {
        let user = Pubkey::new_unique();
        let spending = Pubkey::new_unique();
        let account = TokenAccountState {
            mint: Pubkey::new_unique(),
            owner: user,
            amount: 18,
            delegate: Some(spending),
            delegated_amount: 18,
        };
        assert!(verify_rock_account(CHECK_APPROVE, &account, &user, &spending, 18, 18).is_ok());
        assert!(verify_rock_account(CHECK_APPROVE, &account, &user, &spending, 19, 18).is_err());

        let undelegated = TokenAccountState {
            delegate: None,
            ..account
        };
        assert!(verify_rock_account(MINT_ROCK, &undelegated, &user, &spending, 18, 18).is_err());
    }

    #[test]
    fn test_verify_meme() {
        let meme = Meme {
            name: "moai".to_string(),
            uri: "https://gateway.irys.xyz/moai-meme".to_string(),
            creator: Pubkey::new_unique(),
        };
        assert!(verify_meme(&meme, "moai", "https://gateway.irys.xyz/moai-meme").is_ok());
        assert!(verify_meme(&meme, "rock", "https://gateway.irys.xyz/moai-meme").is_err());
    }
}
