//! End-to-end scenarios against a running validator.
//!
//! This crate drives the Moai program and the Whirlpool proxy program the way
//! a client would:
//! - Harness configuration from defaults and the environment
//! - Wallet loading
//! - Transaction building and sending
//! - Scenario flows with on-chain assertions
//! - Step reports

/// Prelude module for convenient imports.
pub mod prelude;

/// Account reads used by assertions.
pub mod accounts;
/// Harness configuration.
pub mod config;
/// Scenario errors.
pub mod error;
/// Moai program scenario.
pub mod moai_flow;
/// Step reports.
pub mod report;
/// Transaction building and sending.
pub mod transaction;
/// Wallet loading.
pub mod wallet;
/// Whirlpool proxy scenario.
pub mod whirlpool_flow;

pub use error::{ScenarioError, ScenarioFailure};
