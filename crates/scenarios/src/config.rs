//! Harness configuration.
//!
//! Defaults target a local validator started with the Moai, proxy and
//! Whirlpool programs loaded. Every value can be overridden from the
//! environment (or a `.env` file).

use crate::error::ScenarioError;
use crate::wallet::default_keypair_path;
use moai_domain::DomainError;
use moai_domain::math::price_tick::price_to_sqrt_price_x64;
use moai_domain::meme::MemeMetadata;
use moai_domain::token::{LAMPORTS_PER_SOL, Token};
use moai_protocols::programs::{
    MOAI_PROGRAM_ID, WHIRLPOOL_PROGRAM_ID, WHIRLPOOL_PROXY_PROGRAM_ID, WHIRLPOOLS_CONFIG,
};
use moai_protocols::rpc::{LOCALNET_URL, RpcConfig};
use rust_decimal::Decimal;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use std::str::FromStr;

/// Settings of the Moai scenario.
#[derive(Debug, Clone)]
pub struct MoaiScenarioConfig {
    /// Lamports sent from the wallet to the ROCK buyer.
    pub user_funding_lamports: u64,
    /// ROCK bought with `mint_rock`.
    pub rock_amount: u64,
    /// ROCK moved by the spending wallet through its delegation.
    pub delegated_transfer_amount: u64,
    /// Meme created at the end of the scenario.
    pub meme: MemeMetadata,
}

impl Default for MoaiScenarioConfig {
    fn default() -> Self {
        Self {
            user_funding_lamports: 10 * LAMPORTS_PER_SOL,
            rock_amount: 19,
            delegated_transfer_amount: 1,
            meme: MemeMetadata {
                index: "1".to_string(),
                name: "moai".to_string(),
                uri: "https://gateway.irys.xyz/moai-meme".to_string(),
            },
        }
    }
}

/// Settings of the Whirlpool proxy scenario.
#[derive(Debug, Clone)]
pub struct WhirlpoolScenarioConfig {
    pub tick_spacing: u16,
    /// Initial price of the test token in SOL.
    pub initial_price: Decimal,
    /// Decimals of the test token mint.
    pub token_decimals: u8,
    /// Tick arrays initialized on each side of the current one.
    pub tick_array_radius: i32,
    /// Raw test token supply minted to the wallet.
    pub token_supply: u64,
    /// Lamports wrapped into the wallet's wSOL account.
    pub wrap_lamports: u64,
    /// SOL deposited into the position; token A follows from the quote.
    pub liquidity_input_sol: Decimal,
    /// Slippage added to the liquidity quote's token ceilings.
    pub liquidity_slippage_bps: u16,
    /// Number of SOL to token swaps.
    pub swap_count: u32,
    /// Lamports swapped per swap.
    pub swap_lamports: u64,
}

impl Default for WhirlpoolScenarioConfig {
    fn default() -> Self {
        Self {
            tick_spacing: 128,
            initial_price: Decimal::new(5, 4), // 0.0005 SOL
            token_decimals: 9,
            tick_array_radius: 4,
            token_supply: 1_000_000_000_000_000_000,
            wrap_lamports: 1_000_000 * LAMPORTS_PER_SOL,
            liquidity_input_sol: Decimal::from(100_000),
            liquidity_slippage_bps: 0,
            swap_count: 10,
            swap_lamports: 10 * LAMPORTS_PER_SOL,
        }
    }
}

impl WhirlpoolScenarioConfig {
    /// Sqrt price the pool starts at. Token B is always wSOL.
    pub fn initial_sqrt_price(&self) -> Result<u128, DomainError> {
        price_to_sqrt_price_x64(self.initial_price, self.token_decimals, Token::sol().decimals)
    }

    /// Lamports deposited into the position.
    pub fn liquidity_input_lamports(&self) -> Result<u64, DomainError> {
        Token::sol().to_raw(self.liquidity_input_sol)
    }
}

/// Configuration of a harness run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// JSON RPC endpoint.
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub skip_preflight: bool,
    /// Keypair file of the fee payer.
    pub wallet_path: PathBuf,
    pub moai_program_id: Pubkey,
    pub proxy_program_id: Pubkey,
    pub whirlpool_program_id: Pubkey,
    pub whirlpools_config: Pubkey,
    pub moai: MoaiScenarioConfig,
    pub whirlpool: WhirlpoolScenarioConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            rpc_url: LOCALNET_URL.to_string(),
            commitment: CommitmentConfig::confirmed(),
            skip_preflight: true,
            wallet_path: default_keypair_path(),
            moai_program_id: MOAI_PROGRAM_ID,
            proxy_program_id: WHIRLPOOL_PROXY_PROGRAM_ID,
            whirlpool_program_id: WHIRLPOOL_PROGRAM_ID,
            whirlpools_config: WHIRLPOOLS_CONFIG,
            moai: MoaiScenarioConfig::default(),
            whirlpool: WhirlpoolScenarioConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Defaults overridden by environment variables, after loading `.env`.
    pub fn from_env() -> Result<Self, ScenarioError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by the values `lookup` returns.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ScenarioError> {
        let mut config = Self::default();

        if let Some(url) = lookup("RPC_URL") {
            config.rpc_url = url;
        }
        if let Some(level) = lookup("COMMITMENT") {
            config.commitment = parse_commitment(&level)?;
        }
        if let Some(value) = lookup("SKIP_PREFLIGHT") {
            config.skip_preflight = parse("SKIP_PREFLIGHT", &value)?;
        }
        if let Some(path) = lookup("WALLET") {
            config.wallet_path = PathBuf::from(path);
        }
        if let Some(value) = lookup("MOAI_PROGRAM_ID") {
            config.moai_program_id = parse("MOAI_PROGRAM_ID", &value)?;
        }
        if let Some(value) = lookup("PROXY_PROGRAM_ID") {
            config.proxy_program_id = parse("PROXY_PROGRAM_ID", &value)?;
        }
        if let Some(value) = lookup("WHIRLPOOL_PROGRAM_ID") {
            config.whirlpool_program_id = parse("WHIRLPOOL_PROGRAM_ID", &value)?;
        }
        if let Some(value) = lookup("WHIRLPOOLS_CONFIG") {
            config.whirlpools_config = parse("WHIRLPOOLS_CONFIG", &value)?;
        }
        if let Some(value) = lookup("SWAP_COUNT") {
            config.whirlpool.swap_count = parse("SWAP_COUNT", &value)?;
        }
        if let Some(value) = lookup("TICK_SPACING") {
            config.whirlpool.tick_spacing = parse("TICK_SPACING", &value)?;
        }
        if let Some(value) = lookup("INITIAL_PRICE") {
            config.whirlpool.initial_price = parse("INITIAL_PRICE", &value)?;
        }
        if let Some(value) = lookup("ROCK_AMOUNT") {
            config.moai.rock_amount = parse("ROCK_AMOUNT", &value)?;
        }
        if let Some(value) = lookup("MEME_INDEX") {
            config.moai.meme.index = value;
        }
        if let Some(value) = lookup("MEME_URI") {
            config.moai.meme.uri = value;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.moai.meme.validate().map_err(|e| ScenarioError::Config {
            key: "MEME",
            reason: e.to_string(),
        })?;
        if self.whirlpool.tick_spacing == 0 {
            return Err(ScenarioError::Config {
                key: "TICK_SPACING",
                reason: "must be positive".to_string(),
            });
        }
        if self.whirlpool.initial_price <= Decimal::ZERO {
            return Err(ScenarioError::Config {
                key: "INITIAL_PRICE",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            url: self.rpc_url.clone(),
            commitment: self.commitment,
            skip_preflight: self.skip_preflight,
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ScenarioError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ScenarioError::Config {
        key,
        reason: e.to_string(),
    })
}

fn parse_commitment(level: &str) -> Result<CommitmentConfig, ScenarioError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(ScenarioError::Config {
            key: "COMMITMENT",
            reason: format!("unknown level {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(config.moai.rock_amount, 19);
        assert_eq!(config.whirlpool.tick_spacing, 128);
        assert_eq!(config.whirlpool.initial_price, dec!(0.0005));
        assert_eq!(config.whirlpool.swap_lamports, 10_000_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sol_side_keeps_native_decimals() {
        let config = WhirlpoolScenarioConfig {
            token_decimals: 6,
            ..WhirlpoolScenarioConfig::default()
        };
        // 0.0005 SOL per whole token is 0.5 lamports per raw unit
        assert_eq!(
            config.initial_sqrt_price().unwrap(),
            price_to_sqrt_price_x64(dec!(0.5), 9, 9).unwrap()
        );
        assert_ne!(
            config.initial_sqrt_price().unwrap(),
            price_to_sqrt_price_x64(dec!(0.0005), 6, 6).unwrap()
        );
        assert_eq!(config.liquidity_input_lamports().unwrap(), 100_000 * LAMPORTS_PER_SOL);

        let defaults = WhirlpoolScenarioConfig::default();
        assert_eq!(
            defaults.initial_sqrt_price().unwrap(),
            price_to_sqrt_price_x64(dec!(0.0005), 9, 9).unwrap()
        );
    }

    #[test]
    fn test_overrides() {
        let config = HarnessConfig::from_lookup(lookup(&[
            ("RPC_URL", "http://localhost:9000"),
            ("COMMITMENT", "Finalized"),
            ("SKIP_PREFLIGHT", "false"),
            ("SWAP_COUNT", "100"),
            ("WALLET", "/tmp/id.json"),
            ("MEME_INDEX", "42"),
            ("MOAI_PROGRAM_ID", "11111111111111111111111111111111"),
        ]))
        .unwrap();

        assert_eq!(config.rpc_url, "http://localhost:9000");
        assert_eq!(config.commitment, CommitmentConfig::finalized());
        assert!(!config.skip_preflight);
        assert_eq!(config.whirlpool.swap_count, 100);
        assert_eq!(config.wallet_path, PathBuf::from("/tmp/id.json"));
        assert_eq!(config.moai.meme.index, "42");
        assert_eq!(config.moai_program_id, Pubkey::default());

        let rpc = config.rpc_config();
        assert_eq!(rpc.url, "http://localhost:9000");
        assert!(!rpc.skip_preflight);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            HarnessConfig::from_lookup(lookup(&[("SWAP_COUNT", "many")])),
            Err(ScenarioError::Config { key: "SWAP_COUNT", .. })
        ));
        assert!(matches!(
            HarnessConfig::from_lookup(lookup(&[("COMMITMENT", "max")])),
            Err(ScenarioError::Config { key: "COMMITMENT", .. })
        ));
        assert!(matches!(
            HarnessConfig::from_lookup(lookup(&[("TICK_SPACING", "0")])),
            Err(ScenarioError::Config { key: "TICK_SPACING", .. })
        ));
        let long_uri = "u".repeat(101);
        assert!(matches!(
            HarnessConfig::from_lookup(lookup(&[("MEME_URI", long_uri.as_str())])),
            Err(ScenarioError::Config { key: "MEME", .. })
        ));
    }
}
