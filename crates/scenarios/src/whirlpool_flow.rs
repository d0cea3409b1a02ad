//! Whirlpool proxy scenario.
//!
//! Creates a test token (DEOK) ordered before wSOL, opens a DEOK/wSOL pool
//! through the proxy, deposits liquidity over the initialized tick arrays,
//! buys DEOK with SOL from a separate user and collects the fees earned by
//! the position.

use crate::accounts::{decrease, increase, require_token_account, token_amount_or_zero};
use crate::config::WhirlpoolScenarioConfig;
use crate::error::{ScenarioError, ScenarioFailure, ensure_eq};
use crate::report::ScenarioReport;
use crate::transaction::TransactionBuilder;
use crate::wallet::Wallet;
use moai_domain::DomainError;
use moai_domain::math::concentrated_liquidity::{InputToken, increase_liquidity_quote_by_input_token};
use moai_domain::math::price_tick::{sqrt_price_x64_to_tick_index, tick_index_to_sqrt_price_x64};
use moai_domain::math::swap::{SwapEstimate, estimate_swap_within_range};
use moai_domain::math::tick_array::{default_sqrt_price_limit, start_tick_indexes_around};
use moai_domain::token::Token;
use moai_protocols::orca::proxy::PositionAccounts;
use moai_protocols::orca::{
    Position, SwapParams, TickArray, Whirlpool, WhirlpoolProxy, WhirlpoolReader, mint_order,
};
use moai_protocols::programs::NATIVE_MINT;
use moai_protocols::rpc::RpcProvider;
use moai_protocols::spl::{self, MINT_LEN};
use serde::Serialize;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use solana_system_interface::instruction as system_instruction;
use std::sync::Arc;
use tracing::{debug, info};

const SETUP: &str = "setup";
const INITIALIZE_POOL: &str = "initialize pool";
const OPEN_POSITION: &str = "open position";
const INCREASE_LIQUIDITY: &str = "increase liquidity";
const FUND_USER: &str = "fund swap user";
const UPDATE_FEES: &str = "update fees";
const COLLECT_FEES: &str = "collect fees";

/// One SOL to DEOK swap.
#[derive(Debug, Clone, Serialize)]
pub struct SwapRecord {
    /// 1-based swap number.
    pub index: u32,
    pub signature: Signature,
    /// Lamports swapped.
    pub amount_in: u64,
    /// DEOK received.
    pub amount_out: u64,
    /// Single-range estimate, when the swap could be checked against it.
    pub estimated_out: Option<u64>,
    pub sqrt_price_before: u128,
    pub sqrt_price_after: u128,
    pub tick_after: i32,
}

/// Addresses and results of a Whirlpool run.
#[derive(Debug, Clone, Serialize)]
pub struct WhirlpoolFlowOutcome {
    pub report: ScenarioReport,
    pub whirlpool: Pubkey,
    /// Token A of the pool.
    pub deok_mint: Pubkey,
    pub position: Pubkey,
    pub position_mint: Pubkey,
    pub liquidity: u128,
    pub swaps: Vec<SwapRecord>,
    /// Fees collected in token A and token B.
    pub fees_collected: (u64, u64),
}

/// Generates a keypair whose public key sorts before `other`.
///
/// `other` must not be the all-zero key.
pub fn keypair_ordered_before(other: &Pubkey) -> Keypair {
    loop {
        let keypair = Keypair::new();
        if keypair.pubkey().to_bytes() < other.to_bytes() {
            return keypair;
        }
    }
}

/// Highest tick a SOL to DEOK swap from `tick_current_index` can reach in a
/// single step without leaving `tick_array` or crossing an initialized tick.
pub fn swap_boundary_tick(tick_array: &TickArray, tick_current_index: i32, tick_spacing: u16) -> i32 {
    let last_tick = tick_array.end_tick_index(tick_spacing) - i32::from(tick_spacing);
    tick_array
        .next_initialized_tick_index(tick_current_index, tick_spacing, false)
        .map_or(last_tick, |next| next.min(last_tick))
}

/// Whether `estimate` ends strictly below `boundary_tick`, in which case the
/// program computes the swap in one step and the estimate is exact.
pub fn estimate_within_boundary(estimate: &SwapEstimate, boundary_tick: i32) -> Result<bool, DomainError> {
    Ok(estimate.next_sqrt_price < tick_index_to_sqrt_price_x64(boundary_tick)?)
}

/// Checks a freshly initialized pool.
pub fn verify_pool(
    whirlpool: &Whirlpool,
    mint_a: &Pubkey,
    mint_b: &Pubkey,
    tick_spacing: u16,
    sqrt_price: u128,
) -> Result<(), ScenarioError> {
    let step = INITIALIZE_POOL;
    ensure_eq(step, "token mint a", *mint_a, whirlpool.token_mint_a)?;
    ensure_eq(step, "token mint b", *mint_b, whirlpool.token_mint_b)?;
    ensure_eq(step, "tick spacing", tick_spacing, whirlpool.tick_spacing)?;
    ensure_eq(step, "sqrt price", sqrt_price, whirlpool.sqrt_price)?;
    ensure_eq(step, "liquidity", 0, whirlpool.liquidity)
}

pub fn verify_position(
    step: &str,
    position: &Position,
    whirlpool: &Pubkey,
    position_mint: &Pubkey,
    tick_range: (i32, i32),
    liquidity: u128,
) -> Result<(), ScenarioError> {
    ensure_eq(step, "position whirlpool", *whirlpool, position.whirlpool)?;
    ensure_eq(step, "position mint", *position_mint, position.position_mint)?;
    ensure_eq(step, "tick lower index", tick_range.0, position.tick_lower_index)?;
    ensure_eq(step, "tick upper index", tick_range.1, position.tick_upper_index)?;
    ensure_eq(step, "position liquidity", liquidity, position.liquidity)
}

/// Runs the Whirlpool scenario with the wallet as funder, position owner and
/// liquidity provider.
pub struct WhirlpoolFlow<'a> {
    provider: Arc<RpcProvider>,
    reader: WhirlpoolReader<RpcProvider>,
    proxy: WhirlpoolProxy,
    whirlpools_config: Pubkey,
    wallet: &'a Wallet,
    config: WhirlpoolScenarioConfig,
}

impl<'a> WhirlpoolFlow<'a> {
    pub fn new(
        provider: Arc<RpcProvider>,
        wallet: &'a Wallet,
        proxy: WhirlpoolProxy,
        whirlpools_config: Pubkey,
        config: WhirlpoolScenarioConfig,
    ) -> Self {
        Self {
            reader: WhirlpoolReader::new(provider.clone(), proxy.whirlpool_program_id),
            provider,
            proxy,
            whirlpools_config,
            wallet,
            config,
        }
    }

    /// Runs every step. On failure the returned report ends with the failed
    /// step.
    pub async fn run(&self) -> Result<WhirlpoolFlowOutcome, ScenarioFailure> {
        let mut report = ScenarioReport::new("whirlpool");
        info!(
            wallet = %self.wallet.pubkey(),
            swaps = self.config.swap_count,
            "Running whirlpool scenario"
        );
        self.run_steps(&mut report).await.map_err(|error| report.fail(error))
    }

    async fn run_steps(&self, report: &mut ScenarioReport) -> Result<WhirlpoolFlowOutcome, ScenarioError> {
        let deok_mint = self.setup(report).await.map_err(|e| e.in_step(SETUP))?;
        let (mint_a, mint_b) = mint_order(deok_mint, NATIVE_MINT);
        ensure_eq(SETUP, "token a", deok_mint, mint_a)?;

        let (whirlpool, tick_starts) = self
            .initialize_pool(report, mint_a, mint_b)
            .await
            .map_err(|e| e.in_step(INITIALIZE_POOL))?;
        let tick_range = match (tick_starts.first(), tick_starts.last()) {
            (Some(&lower), Some(&upper)) => (lower, upper),
            _ => return Err(ScenarioError::assertion(OPEN_POSITION, "no tick arrays initialized")),
        };
        let (position, position_mint) = self
            .open_position(report, &whirlpool, tick_range)
            .await
            .map_err(|e| e.in_step(OPEN_POSITION))?;
        let liquidity = self
            .increase_liquidity(report, &whirlpool, &position)
            .await
            .map_err(|e| e.in_step(INCREASE_LIQUIDITY))?;
        let swaps = self.swap(report, &whirlpool, &deok_mint).await?;
        let (accounts, owed) = self
            .update_fees(report, &whirlpool, &position)
            .await
            .map_err(|e| e.in_step(UPDATE_FEES))?;
        let fees_collected = self
            .collect_fees(report, &position, &accounts, &owed)
            .await
            .map_err(|e| e.in_step(COLLECT_FEES))?;

        report.finish();
        Ok(WhirlpoolFlowOutcome {
            report: std::mem::take(report),
            whirlpool,
            deok_mint,
            position,
            position_mint,
            liquidity,
            swaps,
            fees_collected,
        })
    }

    /// Creates the DEOK mint, mints the supply to the wallet and wraps SOL.
    async fn setup(&self, report: &mut ScenarioReport) -> Result<Pubkey, ScenarioError> {
        let wallet = self.wallet.keypair();
        let owner = wallet.pubkey();
        let deok = keypair_ordered_before(&NATIVE_MINT);
        let deok_account = spl::get_associated_token_address(&owner, &deok.pubkey());
        let rent = self.provider.get_minimum_balance_for_rent_exemption(MINT_LEN).await?;

        let mut instructions = spl::create_mint(&owner, &deok.pubkey(), &owner, self.config.token_decimals, rent)?;
        instructions.push(spl::create_associated_token_account_idempotent(&owner, &owner, &deok.pubkey()));
        instructions.push(spl::mint_to(&deok.pubkey(), &deok_account, &owner, self.config.token_supply)?);
        instructions.extend(spl::wrap_sol(&owner, &owner, self.config.wrap_lamports)?);

        let wsol_account = spl::get_associated_token_address(&owner, &NATIVE_MINT);
        let wsol_before = token_amount_or_zero(&self.provider, &wsol_account).await?;

        let result = TransactionBuilder::new(SETUP, wallet)
            .add_instructions(instructions, vec![&deok as &dyn Signer])
            .execute(&self.provider)
            .await?;

        let decimals = self.provider.get_mint_decimals(&deok.pubkey()).await?;
        ensure_eq(SETUP, "deok decimals", self.config.token_decimals, decimals)?;
        let deok_balance = require_token_account(&self.provider, &deok_account, SETUP).await?;
        ensure_eq(SETUP, "deok balance", self.config.token_supply, deok_balance.amount)?;
        let wsol_after = token_amount_or_zero(&self.provider, &wsol_account).await?;
        let wrapped = increase(SETUP, "wsol balance", wsol_before, wsol_after)?;
        ensure_eq(SETUP, "wrapped lamports", self.config.wrap_lamports, wrapped)?;

        info!(deok = %deok.pubkey(), wrapped, "Test token created");
        report.passed(SETUP, Some(result.signature), format!("deok mint {}", deok.pubkey()));
        Ok(deok.pubkey())
    }

    /// Initializes the pool and the tick arrays around its price in one
    /// transaction. Returns the pool address and the array start indexes in
    /// ascending order.
    async fn initialize_pool(
        &self,
        report: &mut ScenarioReport,
        mint_a: Pubkey,
        mint_b: Pubkey,
    ) -> Result<(Pubkey, Vec<i32>), ScenarioError> {
        let wallet = self.wallet.keypair();
        let spacing = self.config.tick_spacing;
        let sqrt_price = self.config.initial_sqrt_price()?;
        let tick = sqrt_price_x64_to_tick_index(sqrt_price)?;
        let starts = start_tick_indexes_around(tick, spacing, self.config.tick_array_radius)?;

        let vault_a = Keypair::new();
        let vault_b = Keypair::new();
        let accounts = self.proxy.initialize_pool_accounts(
            self.whirlpools_config,
            mint_a,
            mint_b,
            wallet.pubkey(),
            vault_a.pubkey(),
            vault_b.pubkey(),
            spacing,
        );

        let mut instructions = vec![self.proxy.initialize_pool(&accounts, spacing, sqrt_price)?];
        for start in &starts {
            instructions.push(self.proxy.initialize_tick_array(&accounts.whirlpool, &wallet.pubkey(), *start)?);
        }
        debug!(pool = %accounts.whirlpool, sqrt_price, tick, arrays = starts.len(), "Initializing pool");

        let result = TransactionBuilder::new(INITIALIZE_POOL, wallet)
            .add_instructions(instructions, vec![&vault_a as &dyn Signer, &vault_b as &dyn Signer])
            .execute(&self.provider)
            .await?;

        let whirlpool = self.reader.get_whirlpool(&accounts.whirlpool).await?;
        verify_pool(&whirlpool, &mint_a, &mint_b, spacing, sqrt_price)?;
        ensure_eq(INITIALIZE_POOL, "tick current index", tick, whirlpool.tick_current_index)?;
        for start in &starts {
            let array = self
                .reader
                .find_tick_array(&accounts.whirlpool, *start)
                .await?
                .ok_or_else(|| ScenarioError::assertion(INITIALIZE_POOL, format!("tick array {start} missing")))?;
            ensure_eq(INITIALIZE_POOL, "tick array whirlpool", accounts.whirlpool, array.whirlpool)?;
            ensure_eq(INITIALIZE_POOL, "tick array start", *start, array.start_tick_index)?;
        }

        let price = whirlpool.price(self.config.token_decimals, Token::sol().decimals)?;
        info!(pool = %accounts.whirlpool, %price, tick, "Pool initialized");
        report.passed(
            INITIALIZE_POOL,
            Some(result.signature),
            format!("{} at price {price}, {} tick arrays", accounts.whirlpool, starts.len()),
        );
        Ok((accounts.whirlpool, starts))
    }

    async fn open_position(
        &self,
        report: &mut ScenarioReport,
        whirlpool: &Pubkey,
        tick_range: (i32, i32),
    ) -> Result<(Pubkey, Pubkey), ScenarioError> {
        let wallet = self.wallet.keypair();
        let position_mint = Keypair::new();
        let accounts =
            self.proxy
                .open_position_accounts(*whirlpool, wallet.pubkey(), wallet.pubkey(), position_mint.pubkey());
        let ix = self.proxy.open_position(&accounts, tick_range.0, tick_range.1)?;

        let result = TransactionBuilder::new(OPEN_POSITION, wallet)
            .add_instructions(vec![ix], vec![&position_mint as &dyn Signer])
            .execute(&self.provider)
            .await?;

        let position = self.reader.get_position(&accounts.position).await?;
        verify_position(OPEN_POSITION, &position, whirlpool, &position_mint.pubkey(), tick_range, 0)?;
        let token = require_token_account(&self.provider, &accounts.position_token_account, OPEN_POSITION).await?;
        ensure_eq(OPEN_POSITION, "position token balance", 1, token.amount)?;

        report.passed(
            OPEN_POSITION,
            Some(result.signature),
            format!("{} over [{}, {}]", accounts.position, tick_range.0, tick_range.1),
        );
        Ok((accounts.position, position_mint.pubkey()))
    }

    async fn increase_liquidity(
        &self,
        report: &mut ScenarioReport,
        whirlpool_address: &Pubkey,
        position_address: &Pubkey,
    ) -> Result<u128, ScenarioError> {
        let wallet = self.wallet.keypair();
        let whirlpool = self.reader.get_whirlpool(whirlpool_address).await?;
        let position = self.reader.get_position(position_address).await?;

        let input = self.config.liquidity_input_lamports()?;
        let quote = increase_liquidity_quote_by_input_token(
            InputToken::B,
            input,
            position.tick_lower_index,
            position.tick_upper_index,
            whirlpool.sqrt_price,
            self.config.liquidity_slippage_bps,
        )?;
        debug!(
            liquidity = quote.liquidity_amount,
            token_max_a = quote.token_max_a,
            token_max_b = quote.token_max_b,
            "Liquidity quote"
        );

        let accounts = self.proxy.position_accounts(
            *whirlpool_address,
            &whirlpool,
            *position_address,
            &position,
            wallet.pubkey(),
        )?;
        let ix = self
            .proxy
            .increase_liquidity(&accounts, quote.liquidity_amount, quote.token_max_a, quote.token_max_b)?;
        let result = TransactionBuilder::new(INCREASE_LIQUIDITY, wallet)
            .add_instruction(ix)
            .execute(&self.provider)
            .await?;

        let after = self.reader.get_position(position_address).await?;
        let delta = after.liquidity.checked_sub(position.liquidity).ok_or_else(|| {
            ScenarioError::assertion(INCREASE_LIQUIDITY, "position liquidity decreased")
        })?;
        ensure_eq(INCREASE_LIQUIDITY, "liquidity delta", quote.liquidity_amount, delta)?;
        let pool = self.reader.get_whirlpool(whirlpool_address).await?;
        ensure_eq(INCREASE_LIQUIDITY, "pool liquidity", after.liquidity, pool.liquidity)?;

        report.passed(
            INCREASE_LIQUIDITY,
            Some(result.signature),
            format!("liquidity {}, est {} a / {} b", quote.liquidity_amount, quote.token_est_a, quote.token_est_b),
        );
        Ok(after.liquidity)
    }

    /// Swaps SOL for DEOK `swap_count` times from a fresh user.
    async fn swap(
        &self,
        report: &mut ScenarioReport,
        whirlpool_address: &Pubkey,
        deok_mint: &Pubkey,
    ) -> Result<Vec<SwapRecord>, ScenarioError> {
        let count = self.config.swap_count;
        if count == 0 {
            report.skipped(FUND_USER, "no swaps configured");
            return Ok(Vec::new());
        }

        let wallet = self.wallet.keypair();
        let user = Keypair::new();
        let amount = self.config.swap_lamports;
        let funding = amount
            .checked_mul(u64::from(count))
            .ok_or_else(|| ScenarioError::from(DomainError::Overflow("swap funding")).in_step(FUND_USER))?;
        let result = TransactionBuilder::new(FUND_USER, wallet)
            .add_instruction(system_instruction::transfer(&wallet.pubkey(), &user.pubkey(), funding))
            .execute(&self.provider)
            .await
            .map_err(|e| e.in_step(FUND_USER))?;
        report.passed(FUND_USER, Some(result.signature), format!("{} funded with {funding}", user.pubkey()));

        let user_deok = spl::get_associated_token_address(&user.pubkey(), deok_mint);
        let mut records = Vec::with_capacity(count as usize);
        for index in 1..=count {
            let record = self
                .swap_once(index, &user, whirlpool_address, deok_mint, &user_deok)
                .await
                .map_err(|e| e.in_step(format!("swap {index}")))?;
            let detail = match record.estimated_out {
                Some(_) => format!("{} lamports -> {} deok (estimate matched)", record.amount_in, record.amount_out),
                None => format!("{} lamports -> {} deok (estimate skipped)", record.amount_in, record.amount_out),
            };
            report.passed(format!("swap {index}"), Some(record.signature), detail);
            records.push(record);
        }
        Ok(records)
    }

    async fn swap_once(
        &self,
        index: u32,
        user: &Keypair,
        whirlpool_address: &Pubkey,
        deok_mint: &Pubkey,
        user_deok: &Pubkey,
    ) -> Result<SwapRecord, ScenarioError> {
        let step = format!("swap {index}");
        let wallet = self.wallet.keypair();
        let amount = self.config.swap_lamports;

        let whirlpool = self.reader.get_whirlpool(whirlpool_address).await?;
        let tick_array = self.reader.current_tick_array(whirlpool_address, &whirlpool).await?;
        let boundary = swap_boundary_tick(&tick_array, whirlpool.tick_current_index, whirlpool.tick_spacing);
        let estimate = estimate_swap_within_range(
            whirlpool.sqrt_price,
            whirlpool.liquidity,
            whirlpool.fee_rate,
            amount,
            false,
        );
        let checked_estimate = match estimate {
            Some(estimate) if estimate_within_boundary(&estimate, boundary)? => Some(estimate),
            _ => None,
        };

        let vault_a_before = self.provider.get_token_balance(&whirlpool.token_vault_a).await?;
        let deok_before = token_amount_or_zero(&self.provider, user_deok).await?;

        let mut instructions = vec![spl::create_associated_token_account_idempotent(
            &wallet.pubkey(),
            &user.pubkey(),
            deok_mint,
        )];
        instructions.extend(spl::wrap_sol(&wallet.pubkey(), &user.pubkey(), amount)?);
        let accounts = self
            .proxy
            .swap_accounts(*whirlpool_address, &whirlpool, user.pubkey(), false)?;
        let params = SwapParams {
            amount,
            other_amount_threshold: 0,
            sqrt_price_limit: default_sqrt_price_limit(false),
            amount_specified_is_input: true,
            a_to_b: false,
        };
        instructions.push(self.proxy.swap(&accounts, &params)?);

        let result = TransactionBuilder::new(step.clone(), wallet)
            .add_instructions(instructions, vec![user as &dyn Signer])
            .execute(&self.provider)
            .await?;

        let deok_after = token_amount_or_zero(&self.provider, user_deok).await?;
        let received = increase(&step, "deok balance", deok_before, deok_after)?;
        let vault_a_after = self.provider.get_token_balance(&whirlpool.token_vault_a).await?;
        let vault_decrease = decrease(&step, "vault a balance", vault_a_before, vault_a_after)?;
        ensure_eq(&step, "deok received vs vault a decrease", vault_decrease, received)?;
        if let Some(estimate) = &checked_estimate {
            ensure_eq(&step, "deok received vs estimate", estimate.amount_out, received)?;
        }

        let after = self.reader.get_whirlpool(whirlpool_address).await?;
        debug!(
            index,
            received,
            tick = after.tick_current_index,
            estimated = checked_estimate.is_some(),
            "Swap verified"
        );
        Ok(SwapRecord {
            index,
            signature: result.signature,
            amount_in: amount,
            amount_out: received,
            estimated_out: checked_estimate.map(|estimate| estimate.amount_out),
            sqrt_price_before: whirlpool.sqrt_price,
            sqrt_price_after: after.sqrt_price,
            tick_after: after.tick_current_index,
        })
    }

    /// Refreshes the fees owed to the position. Returns the accounts used
    /// for collecting and the refreshed position.
    async fn update_fees(
        &self,
        report: &mut ScenarioReport,
        whirlpool_address: &Pubkey,
        position_address: &Pubkey,
    ) -> Result<(PositionAccounts, Position), ScenarioError> {
        let wallet = self.wallet.keypair();
        let whirlpool = self.reader.get_whirlpool(whirlpool_address).await?;
        let position = self.reader.get_position(position_address).await?;
        let accounts = self.proxy.position_accounts(
            *whirlpool_address,
            &whirlpool,
            *position_address,
            &position,
            wallet.pubkey(),
        )?;

        let result = TransactionBuilder::new(UPDATE_FEES, wallet)
            .add_instruction(self.proxy.update_fees_and_rewards(&accounts))
            .execute(&self.provider)
            .await?;
        let updated = self.reader.get_position(position_address).await?;
        if self.config.swap_count > 0 && updated.fee_owed_b == 0 {
            return Err(ScenarioError::assertion(UPDATE_FEES, "no token b fees owed after swaps"));
        }
        report.passed(
            UPDATE_FEES,
            Some(result.signature),
            format!("owed {} a / {} b", updated.fee_owed_a, updated.fee_owed_b),
        );
        Ok((accounts, updated))
    }

    /// Collects the fees owed by `owed` to the wallet.
    async fn collect_fees(
        &self,
        report: &mut ScenarioReport,
        position_address: &Pubkey,
        accounts: &PositionAccounts,
        owed: &Position,
    ) -> Result<(u64, u64), ScenarioError> {
        let wallet = self.wallet.keypair();
        let a_before = token_amount_or_zero(&self.provider, &accounts.token_owner_account_a).await?;
        let b_before = token_amount_or_zero(&self.provider, &accounts.token_owner_account_b).await?;
        let result = TransactionBuilder::new(COLLECT_FEES, wallet)
            .add_instruction(self.proxy.collect_fees(accounts))
            .execute(&self.provider)
            .await?;
        let a_after = token_amount_or_zero(&self.provider, &accounts.token_owner_account_a).await?;
        let b_after = token_amount_or_zero(&self.provider, &accounts.token_owner_account_b).await?;

        let collected_a = increase(COLLECT_FEES, "token a balance", a_before, a_after)?;
        let collected_b = increase(COLLECT_FEES, "token b balance", b_before, b_after)?;
        ensure_eq(COLLECT_FEES, "token a fees", owed.fee_owed_a, collected_a)?;
        ensure_eq(COLLECT_FEES, "token b fees", owed.fee_owed_b, collected_b)?;

        let collected = self.reader.get_position(position_address).await?;
        ensure_eq(COLLECT_FEES, "fee owed a", 0, collected.fee_owed_a)?;
        ensure_eq(COLLECT_FEES, "fee owed b", 0, collected.fee_owed_b)?;

        info!(collected_a, collected_b, "Fees collected");
        report.passed(
            COLLECT_FEES,
            Some(result.signature),
            format!("collected {collected_a} a / {collected_b} b"),
        );
        Ok((collected_a, collected_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moai_domain::math::price_tick::MAX_SQRT_PRICE_X64;

    const SQRT_PRICE: u128 = 412_481_737_123_559_485;
    const TICK: i32 = -76_013;
    const SPACING: u16 = 128;

    #[test]
    fn test_keypair_ordered_before_native_mint() {
        for _ in 0..3 {
            let keypair = keypair_ordered_before(&NATIVE_MINT);
            let (a, b) = mint_order(keypair.pubkey(), NATIVE_MINT);
            assert_eq!(a, keypair.pubkey());
            assert_eq!(b, NATIVE_MINT);
        }
    }

    #[test]
    fn test_boundary_without_initialized_ticks() {
        let array = TickArray::new(Pubkey::new_unique(), -78_848);
        assert_eq!(swap_boundary_tick(&array, TICK, SPACING), -67_712);
    }

    #[test]
    fn test_boundary_stops_at_next_initialized_tick() {
        let mut array = TickArray::new(Pubkey::new_unique(), -78_848);
        // -76_032 is below the current tick, -75_904 above it
        array.ticks[22].initialized = true;
        array.ticks[23].initialized = true;
        assert_eq!(swap_boundary_tick(&array, TICK, SPACING), -75_904);
    }

    #[test]
    fn test_estimate_within_boundary() {
        let estimate = estimate_swap_within_range(SQRT_PRICE, 1_000_000_000_000_000, 10_000, 10_000_000_000, false)
            .unwrap();
        assert!(estimate.next_sqrt_price > SQRT_PRICE);

        assert!(estimate_within_boundary(&estimate, -67_712).unwrap());
        assert!(estimate_within_boundary(&estimate, -76_000).unwrap());
        assert!(!estimate_within_boundary(&estimate, -76_008).unwrap());
        assert!(!estimate_within_boundary(&estimate, TICK).unwrap());
    }

    #[test]
    fn test_estimate_within_boundary_rejects_invalid_tick() {
        let estimate = SwapEstimate {
            amount_in: 1,
            amount_out: 1,
            fee_amount: 0,
            next_sqrt_price: MAX_SQRT_PRICE_X64,
        };
        assert!(estimate_within_boundary(&estimate, 500_000).is_err());
    }

    #[test]
    fn test_verify_pool() {
        let mint_a = Pubkey::new_unique();
        let mint_b = Pubkey::new_unique();
        let mut whirlpool = Whirlpool {
            tick_spacing: SPACING,
            sqrt_price: SQRT_PRICE,
            token_mint_a: mint_a,
            token_mint_b: mint_b,
            ..Whirlpool::default()
        };
        assert!(verify_pool(&whirlpool, &mint_a, &mint_b, SPACING, SQRT_PRICE).is_ok());
        assert!(verify_pool(&whirlpool, &mint_b, &mint_a, SPACING, SQRT_PRICE).is_err());

        whirlpool.liquidity = 5;
        assert!(verify_pool(&whirlpool, &mint_a, &mint_b, SPACING, SQRT_PRICE).is_err());
    }

    #[test]
    fn test_verify_position() {
        let whirlpool = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let position = Position {
            whirlpool,
            position_mint: mint,
            tick_lower_index: -123_904,
            tick_upper_index: -33_792,
            ..Position::default()
        };
        let range = (-123_904, -33_792);
        assert!(verify_position(OPEN_POSITION, &position, &whirlpool, &mint, range, 0).is_ok());

        let err = verify_position(OPEN_POSITION, &position, &whirlpool, &mint, range, 7).unwrap_err();
        assert_eq!(err.to_string(), "Step 'open position' failed: position liquidity: expected 7, got 0");
    }
}
