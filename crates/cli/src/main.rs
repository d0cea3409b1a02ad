//! Command Line Interface for the Moai harness.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use moai_domain::token::{LAMPORTS_PER_SOL, amount_to_ui_amount_string};
use moai_protocols::moai::pda as moai_pda;
use moai_protocols::orca::WhirlpoolProxy;
use moai_protocols::programs::NATIVE_MINT;
use moai_protocols::rpc::RpcProvider;
use moai_protocols::spl::get_associated_token_address;
use moai_scenarios::prelude::*;
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "moai-harness")]
#[command(about = "Runs the Moai and Whirlpool proxy scenarios against a validator", long_about = None)]
struct Cli {
    /// RPC endpoint, overrides RPC_URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Keypair file of the fee payer, overrides WALLET
    #[arg(long, global = true)]
    wallet: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Moai scenario
    Moai,
    /// Run the Whirlpool proxy scenario
    Whirlpool {
        /// Number of SOL to DEOK swaps, overrides SWAP_COUNT
        #[arg(long)]
        swaps: Option<u32>,
    },
    /// Run every scenario
    All,
    /// Airdrop SOL to the wallet (localnet and devnet only)
    Airdrop {
        /// Amount in SOL
        #[arg(long, default_value_t = 100)]
        sol: u64,
    },
    /// Print the addresses derived for an authority
    Addresses {
        /// Moai authority, defaults to the wallet
        #[arg(long)]
        authority: Option<String>,

        /// Spending wallet, adds its user info and vote addresses
        #[arg(long)]
        spending: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = HarnessConfig::from_env()?;
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(path) = &cli.wallet {
        config.wallet_path = path.clone();
    }
    if let Commands::Whirlpool { swaps: Some(swaps) } = &cli.command {
        config.whirlpool.swap_count = *swaps;
    }
    config.validate()?;
    info!(rpc = %config.rpc_url, wallet = %config.wallet_path.display(), "Harness configured");

    match &cli.command {
        Commands::Moai => {
            let wallet = load_wallet(&config)?;
            run_moai(&config, &wallet, cli.json).await?;
        }
        Commands::Whirlpool { .. } => {
            let wallet = load_wallet(&config)?;
            run_whirlpool(&config, &wallet, cli.json).await?;
        }
        Commands::All => {
            let wallet = load_wallet(&config)?;
            run_moai(&config, &wallet, cli.json).await?;
            run_whirlpool(&config, &wallet, cli.json).await?;
        }
        Commands::Airdrop { sol } => {
            let wallet = load_wallet(&config)?;
            let lamports = sol
                .checked_mul(LAMPORTS_PER_SOL)
                .context("airdrop amount overflows")?;
            let provider = provider(&config);
            println!("💧 Requesting {} SOL for {}...", sol, wallet.pubkey());
            let signature = provider.request_airdrop(&wallet.pubkey(), lamports).await?;
            let balance = provider.get_balance(&wallet.pubkey()).await?;
            println!("✅ Airdrop confirmed: {}", signature);
            println!("Balance: {} SOL", amount_to_ui_amount_string(balance, 9));
        }
        Commands::Addresses { authority, spending } => {
            let authority = match authority {
                Some(key) => parse_pubkey("authority", key)?,
                None => load_wallet(&config)?.pubkey(),
            };
            let spending = spending
                .as_deref()
                .map(|key| parse_pubkey("spending", key))
                .transpose()?;
            print_addresses(&config, &authority, spending.as_ref());
        }
    }

    Ok(())
}

fn load_wallet(config: &HarnessConfig) -> Result<Wallet> {
    Wallet::load(config.wallet_path.clone())
        .with_context(|| format!("loading wallet {}", config.wallet_path.display()))
}

fn parse_pubkey(what: &str, key: &str) -> Result<Pubkey> {
    Pubkey::from_str(key).with_context(|| format!("invalid {what} {key}"))
}

fn provider(config: &HarnessConfig) -> Arc<RpcProvider> {
    Arc::new(RpcProvider::new(config.rpc_config()))
}

/// Prints the steps recorded before a scenario stopped.
fn print_failure(failure: &ScenarioFailure, json: bool) -> Result<()> {
    if json {
        println!("{}", failure.report.to_json()?);
    } else {
        println!("{}", failure.report.render_table());
        println!("❌ {failure}");
    }
    Ok(())
}

async fn run_moai(config: &HarnessConfig, wallet: &Wallet, json: bool) -> Result<()> {
    if !json {
        println!("🗿 Running Moai scenario on {}...", config.rpc_url);
    }
    let flow = MoaiFlow::new(provider(config), wallet, config.moai_program_id, config.moai.clone());
    let outcome = match flow.run().await {
        Ok(outcome) => outcome,
        Err(failure) => {
            print_failure(&failure, json)?;
            return Err(failure).context("moai scenario failed");
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    println!("{}", outcome.report.render_table());
    println!("✅ Moai scenario passed");
    println!("Moai:        {}", outcome.moai);
    println!("ROCK mint:   {}", outcome.rock_mint);
    println!("MOAI mint:   {}", outcome.moai_mint);
    println!("Escrow:      {}", outcome.escrow);
    println!("Meme:        {}", outcome.meme);
    Ok(())
}

async fn run_whirlpool(config: &HarnessConfig, wallet: &Wallet, json: bool) -> Result<()> {
    if !json {
        println!(
            "🌊 Running Whirlpool scenario on {} with {} swaps...",
            config.rpc_url, config.whirlpool.swap_count
        );
    }
    let proxy = WhirlpoolProxy::new(config.proxy_program_id, config.whirlpool_program_id);
    let flow = WhirlpoolFlow::new(
        provider(config),
        wallet,
        proxy,
        config.whirlpools_config,
        config.whirlpool.clone(),
    );
    let outcome = match flow.run().await {
        Ok(outcome) => outcome,
        Err(failure) => {
            print_failure(&failure, json)?;
            return Err(failure).context("whirlpool scenario failed");
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    println!("{}", outcome.report.render_table());

    let checked = outcome.swaps.iter().filter(|swap| swap.estimated_out.is_some()).count();
    let received: u64 = outcome.swaps.iter().map(|swap| swap.amount_out).sum();
    println!("\n📊 Whirlpool Results");
    println!("════════════════════════════════════");
    println!("Whirlpool:       {}", outcome.whirlpool);
    println!("DEOK mint:       {}", outcome.deok_mint);
    println!("Position:        {}", outcome.position);
    println!("Liquidity:       {}", outcome.liquidity);
    println!("Swaps:           {} ({} checked against estimate)", outcome.swaps.len(), checked);
    println!("DEOK received:   {}", received);
    println!("Fees collected:  {} A / {} B", outcome.fees_collected.0, outcome.fees_collected.1);
    println!("════════════════════════════════════");
    println!("✅ Whirlpool scenario passed");
    Ok(())
}

fn print_addresses(config: &HarnessConfig, authority: &Pubkey, spending: Option<&Pubkey>) {
    let program_id = &config.moai_program_id;
    let (moai, nonce) = moai_pda::moai_address(program_id, authority);
    let (meme, _) = moai_pda::meme_address(program_id, &config.moai.meme.index);

    println!("🔑 Addresses for authority {}", authority);
    println!("{}", "-".repeat(70));
    println!("{:<18} | {}", "Moai program", program_id);
    println!("{:<18} | {} (bump {})", "Moai", moai, nonce);
    println!("{:<18} | {}", "Escrow", get_associated_token_address(&moai, &NATIVE_MINT));
    println!("{:<18} | {}", format!("Meme {}", config.moai.meme.index), meme);
    if let Some(spending) = spending {
        let (user_info, _) = moai_pda::user_info_address(program_id, &moai, spending);
        let (vote, _) = moai_pda::vote_address(program_id, spending, &meme);
        println!("{:<18} | {}", "User info", user_info);
        println!("{:<18} | {}", "Vote", vote);
    }
    println!("{:<18} | {}", "Proxy program", config.proxy_program_id);
    println!("{:<18} | {}", "Whirlpool program", config.whirlpool_program_id);
    println!("{:<18} | {}", "Whirlpools config", config.whirlpools_config);
}
