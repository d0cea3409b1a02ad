//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use moai_scenarios::prelude::*;
//! ```

pub use crate::config::{HarnessConfig, MoaiScenarioConfig, WhirlpoolScenarioConfig};
pub use crate::error::{ScenarioError, ScenarioFailure};
pub use crate::moai_flow::{MoaiFlow, MoaiFlowOutcome};
pub use crate::report::{ScenarioReport, StepRecord, StepStatus};
pub use crate::transaction::{TransactionBuilder, TransactionResult};
pub use crate::wallet::{Wallet, load_keypair};
pub use crate::whirlpool_flow::{SwapRecord, WhirlpoolFlow, WhirlpoolFlowOutcome};
