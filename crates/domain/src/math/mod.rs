//! Concentrated-liquidity math used by the Whirlpool scenarios.
//!
//! Sqrt prices are Q64.64 fixed point (`sqrt(price) * 2^64`), matching the
//! on-chain representation.

/// Liquidity and token amount conversions.
pub mod concentrated_liquidity;
/// Price, tick and sqrt price conversions.
pub mod price_tick;
/// Single-range swap estimates.
pub mod swap;
/// Tick array addressing.
pub mod tick_array;

/// `2^64` as used by the Q64.64 representation.
pub const Q64: u128 = 1u128 << 64;
