//! Moai program adapter.
//!
//! The Moai program sells ROCK for SOL, keeping the proceeds in a wSOL escrow
//! owned by the Moai PDA, and stores meme metadata in per-index PDAs.

/// Executor sending Moai instructions.
pub mod executor;
/// Instruction builders.
pub mod instructions;
/// Program derived addresses.
pub mod pda;
/// Account layouts.
pub mod state;

pub use executor::MoaiExecutor;
pub use state::{Meme, Moai};
