//! Scenarios against a local validator with the Moai, proxy and Whirlpool
//! programs deployed. Run with `cargo test -p moai-scenarios -- --ignored`.

use anyhow::{Context, Result};
use moai_protocols::orca::WhirlpoolProxy;
use moai_protocols::rpc::RpcProvider;
use moai_scenarios::prelude::*;
use std::sync::Arc;

fn harness() -> Result<(HarnessConfig, Arc<RpcProvider>, Wallet)> {
    let _ = tracing_subscriber::fmt::try_init();
    let config = HarnessConfig::from_env().context("loading harness configuration")?;
    config.validate()?;
    let wallet = Wallet::load(config.wallet_path.clone()).context("loading wallet")?;
    let provider = Arc::new(RpcProvider::new(config.rpc_config()));
    Ok((config, provider, wallet))
}

// One test for both runs: the Moai account is shared per wallet.
#[tokio::test]
#[ignore = "requires a local validator"]
async fn moai_scenario_passes_and_reruns() -> Result<()> {
    let (config, provider, wallet) = harness()?;
    let flow = MoaiFlow::new(provider, &wallet, config.moai_program_id, config.moai.clone());

    let first = flow.run().await?;
    assert!(first.report.is_success());
    assert!(first.report.steps.iter().any(|step| step.name == "mint rock"));

    let second = flow.run().await?;
    assert!(second.report.is_success());
    assert_eq!(first.moai, second.moai);
    assert_eq!(first.rock_mint, second.rock_mint);
    assert_ne!(first.user, second.user);
    assert_eq!(second.report.count(StepStatus::Skipped), 2);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a local validator"]
async fn whirlpool_scenario_passes() -> Result<()> {
    let (mut config, provider, wallet) = harness()?;
    config.whirlpool.swap_count = 3;
    let proxy = WhirlpoolProxy::new(config.proxy_program_id, config.whirlpool_program_id);
    let flow = WhirlpoolFlow::new(
        provider,
        &wallet,
        proxy,
        config.whirlpools_config,
        config.whirlpool.clone(),
    );

    let outcome = flow.run().await?;
    assert!(outcome.report.is_success());
    assert_eq!(outcome.swaps.len(), 3);
    assert!(outcome.swaps.iter().all(|swap| swap.amount_out > 0));
    assert!(outcome.fees_collected.1 > 0);
    Ok(())
}
