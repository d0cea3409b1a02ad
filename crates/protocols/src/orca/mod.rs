//! Orca Whirlpool adapter.
//!
//! Pools are driven through the proxy program, which forwards each call to
//! the Whirlpool program:
//! - Derive pool, position and tick array addresses
//! - Build proxy instructions
//! - Read pool, position and tick array state

/// Program derived addresses.
pub mod pda;
/// Proxy instruction builders.
pub mod proxy;
/// Reader for on-chain state.
pub mod reader;
/// Whirlpool account structures.
pub mod whirlpool;

pub use proxy::{SwapParams, WhirlpoolProxy};
pub use reader::WhirlpoolReader;
pub use whirlpool::{Position, Tick, TickArray, Whirlpool, mint_order};
