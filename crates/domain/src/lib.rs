//! Pure helpers shared by the Moai and Whirlpool harness crates.
//!
//! Nothing in this crate talks to a cluster. It holds token formatting,
//! the ROCK purchase economics of the Moai program, meme metadata limits and
//! the subset of concentrated-liquidity math the scenarios need to pick tick
//! arrays and size deposits.

/// Domain error type.
pub mod error;
/// Concentrated-liquidity math.
pub mod math;
/// Meme metadata validation.
pub mod meme;
/// ROCK purchase economics.
pub mod rock;
/// Token descriptors and amounts.
pub mod token;

pub use error::DomainError;
