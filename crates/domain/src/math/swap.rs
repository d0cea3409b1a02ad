//! Exact-input swap estimate for a swap that stays between two initialized
//! ticks.
//!
//! The estimate follows the pool's fixed point rules for one swap step: the
//! fee is taken from the input first, the next sqrt price is derived from the
//! remaining input, the consumed input is rounded up and the output rounded
//! down. Swaps that cross an initialized tick or a tick array boundary are
//! split into several steps on chain and may differ by rounding.

use super::concentrated_liquidity::{get_amount_a_delta, get_amount_b_delta};
use super::price_tick::{MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Fee rates are expressed in hundredths of a basis point.
pub const FEE_RATE_DENOMINATOR: u64 = 1_000_000;

/// Result of a single-range swap estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEstimate {
    /// Input consumed by the price move, excluding the fee.
    pub amount_in: u64,
    /// Output released by the pool.
    pub amount_out: u64,
    /// Fee charged on the input.
    pub fee_amount: u64,
    /// Sqrt price after the swap.
    pub next_sqrt_price: u128,
}

/// Estimates an exact-input swap of `amount` against constant `liquidity`.
///
/// Returns `None` when liquidity is zero, the arithmetic overflows or the
/// move would leave the valid sqrt price range.
pub fn estimate_swap_within_range(
    sqrt_price: u128,
    liquidity: u128,
    fee_rate: u16,
    amount: u64,
    a_to_b: bool,
) -> Option<SwapEstimate> {
    if liquidity == 0 || amount == 0 {
        return None;
    }

    let amount_after_fee = (U256::from(amount)
        * U256::from(FEE_RATE_DENOMINATOR - u64::from(fee_rate)))
        / U256::from(FEE_RATE_DENOMINATOR);
    let amount_after_fee = amount_after_fee.as_u64();

    let next_sqrt_price = if a_to_b {
        next_sqrt_price_from_a_round_up(sqrt_price, liquidity, amount_after_fee)?
    } else {
        next_sqrt_price_from_b_round_down(sqrt_price, liquidity, amount_after_fee)?
    };
    if !(MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&next_sqrt_price) {
        return None;
    }

    let (amount_in, amount_out) = if a_to_b {
        (
            get_amount_a_delta(liquidity, next_sqrt_price, sqrt_price, true).ok()?,
            get_amount_b_delta(liquidity, next_sqrt_price, sqrt_price, false).ok()?,
        )
    } else {
        (
            get_amount_b_delta(liquidity, sqrt_price, next_sqrt_price, true).ok()?,
            get_amount_a_delta(liquidity, sqrt_price, next_sqrt_price, false).ok()?,
        )
    };

    Some(SwapEstimate {
        amount_in,
        amount_out,
        fee_amount: amount.checked_sub(amount_in)?,
        next_sqrt_price,
    })
}

/// sqrt_next = L * sqrt_p / (L + amount * sqrt_p), rounded up.
fn next_sqrt_price_from_a_round_up(sqrt_price: u128, liquidity: u128, amount: u64) -> Option<u128> {
    if amount == 0 {
        return Some(sqrt_price);
    }
    let liquidity_x64 = U256::from(liquidity) << 64;
    let product = U256::from(sqrt_price).checked_mul(U256::from(amount))?;
    let numerator = liquidity_x64.checked_mul(U256::from(sqrt_price))?;
    let denominator = liquidity_x64.checked_add(product)?;

    let quotient = numerator / denominator;
    let next = if (numerator % denominator).is_zero() {
        quotient
    } else {
        quotient + U256::one()
    };
    (next <= U256::from(u128::MAX)).then(|| next.as_u128())
}

/// sqrt_next = sqrt_p + amount / L, rounded down.
fn next_sqrt_price_from_b_round_down(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
) -> Option<u128> {
    let delta = (U256::from(amount) << 64) / U256::from(liquidity);
    let next = U256::from(sqrt_price).checked_add(delta)?;
    (next <= U256::from(u128::MAX)).then(|| next.as_u128())
}
