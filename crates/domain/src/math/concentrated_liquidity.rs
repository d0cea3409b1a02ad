use super::price_tick::tick_index_to_sqrt_price_x64;
use crate::error::DomainError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

const BPS_DENOMINATOR: u64 = 10_000;

fn ordered(sqrt_price_a: u128, sqrt_price_b: u128) -> (u128, u128) {
    if sqrt_price_a < sqrt_price_b {
        (sqrt_price_a, sqrt_price_b)
    } else {
        (sqrt_price_b, sqrt_price_a)
    }
}

fn to_u64(value: U256, context: &'static str) -> Result<u64, DomainError> {
    if value > U256::from(u64::MAX) {
        return Err(DomainError::Overflow(context));
    }
    Ok(value.as_u64())
}

fn to_u128(value: U256, context: &'static str) -> Result<u128, DomainError> {
    if value > U256::from(u128::MAX) {
        return Err(DomainError::Overflow(context));
    }
    Ok(value.as_u128())
}

/// Calculates the amount of token A given liquidity and a sqrt price range.
/// delta_a = L * (sqrt(P_b) - sqrt(P_a)) / (sqrt(P_a) * sqrt(P_b))
pub fn get_amount_a_delta(
    liquidity: u128,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
    round_up: bool,
) -> Result<u64, DomainError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    if lower == 0 {
        return Err(DomainError::NonPositivePrice);
    }

    let numerator = (U256::from(liquidity) << 64)
        .checked_mul(U256::from(upper - lower))
        .ok_or(DomainError::Overflow("get_amount_a_delta"))?;
    let denominator = U256::from(lower) * U256::from(upper);

    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let amount = if round_up && !remainder.is_zero() {
        quotient + U256::one()
    } else {
        quotient
    };
    to_u64(amount, "get_amount_a_delta")
}

/// Calculates the amount of token B given liquidity and a sqrt price range.
/// delta_b = L * (sqrt(P_b) - sqrt(P_a))
pub fn get_amount_b_delta(
    liquidity: u128,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
    round_up: bool,
) -> Result<u64, DomainError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);

    let product = U256::from(liquidity) * U256::from(upper - lower);
    let low_bits = product & U256::from(u64::MAX);
    let quotient = product >> 64;
    let amount = if round_up && !low_bits.is_zero() {
        quotient + U256::one()
    } else {
        quotient
    };
    to_u64(amount, "get_amount_b_delta")
}

/// Calculates liquidity for a given amount of token A and sqrt price range.
/// L = amount_a * sqrt(P_a) * sqrt(P_b) / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount_a(
    amount_a: u64,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
) -> Result<u128, DomainError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    if lower == upper {
        return Err(DomainError::EmptyRange);
    }

    // sqrt prices are Q64.64 so the product carries an extra 2^64
    let numerator = U256::from(amount_a)
        .checked_mul(U256::from(lower) * U256::from(upper))
        .ok_or(DomainError::Overflow("get_liquidity_for_amount_a"))?;
    let denominator = U256::from(upper - lower) << 64;

    to_u128(numerator / denominator, "get_liquidity_for_amount_a")
}

/// Calculates liquidity for a given amount of token B and sqrt price range.
/// L = amount_b / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount_b(
    amount_b: u64,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
) -> Result<u128, DomainError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    if lower == upper {
        return Err(DomainError::EmptyRange);
    }

    let numerator = U256::from(amount_b) << 64;
    let denominator = U256::from(upper - lower);

    to_u128(numerator / denominator, "get_liquidity_for_amount_b")
}

/// Token amounts required to hold `liquidity` across a range at the current
/// sqrt price, rounded up.
pub fn get_token_amounts_for_liquidity(
    liquidity: u128,
    sqrt_price_current: u128,
    sqrt_price_lower: u128,
    sqrt_price_upper: u128,
) -> Result<(u64, u64), DomainError> {
    if sqrt_price_current < sqrt_price_lower {
        let amount_a = get_amount_a_delta(liquidity, sqrt_price_lower, sqrt_price_upper, true)?;
        Ok((amount_a, 0))
    } else if sqrt_price_current >= sqrt_price_upper {
        let amount_b = get_amount_b_delta(liquidity, sqrt_price_lower, sqrt_price_upper, true)?;
        Ok((0, amount_b))
    } else {
        let amount_a = get_amount_a_delta(liquidity, sqrt_price_current, sqrt_price_upper, true)?;
        let amount_b = get_amount_b_delta(liquidity, sqrt_price_lower, sqrt_price_current, true)?;
        Ok((amount_a, amount_b))
    }
}

/// Which side of the pool a deposit is sized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputToken {
    A,
    B,
}

/// Quote for an `increase_liquidity` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreaseLiquidityQuote {
    /// Liquidity to add.
    pub liquidity_amount: u128,
    /// Expected token A deposit.
    pub token_est_a: u64,
    /// Expected token B deposit.
    pub token_est_b: u64,
    /// Token A ceiling passed to the program.
    pub token_max_a: u64,
    /// Token B ceiling passed to the program.
    pub token_max_b: u64,
}

impl IncreaseLiquidityQuote {
    fn zero() -> Self {
        Self {
            liquidity_amount: 0,
            token_est_a: 0,
            token_est_b: 0,
            token_max_a: 0,
            token_max_b: 0,
        }
    }
}

/// Adds `slippage_bps` to an amount, rounding up.
pub fn with_slippage(amount: u64, slippage_bps: u16) -> Result<u64, DomainError> {
    let scaled = U256::from(amount) * U256::from(BPS_DENOMINATOR + u64::from(slippage_bps));
    let denominator = U256::from(BPS_DENOMINATOR);
    let mut adjusted = scaled / denominator;
    if !(scaled % denominator).is_zero() {
        adjusted += U256::one();
    }
    to_u64(adjusted, "with_slippage")
}

/// Quotes the liquidity obtainable from `input_amount` of one token for a
/// position between two ticks.
///
/// Returns an all-zero quote when the current price sits on the side of the
/// range that does not use the input token.
pub fn increase_liquidity_quote_by_input_token(
    input_token: InputToken,
    input_amount: u64,
    tick_lower_index: i32,
    tick_upper_index: i32,
    sqrt_price_current: u128,
    slippage_bps: u16,
) -> Result<IncreaseLiquidityQuote, DomainError> {
    if tick_lower_index >= tick_upper_index {
        return Err(DomainError::EmptyRange);
    }
    let sqrt_lower = tick_index_to_sqrt_price_x64(tick_lower_index)?;
    let sqrt_upper = tick_index_to_sqrt_price_x64(tick_upper_index)?;

    let liquidity_amount = if sqrt_price_current < sqrt_lower {
        match input_token {
            InputToken::A => get_liquidity_for_amount_a(input_amount, sqrt_lower, sqrt_upper)?,
            InputToken::B => return Ok(IncreaseLiquidityQuote::zero()),
        }
    } else if sqrt_price_current >= sqrt_upper {
        match input_token {
            InputToken::A => return Ok(IncreaseLiquidityQuote::zero()),
            InputToken::B => get_liquidity_for_amount_b(input_amount, sqrt_lower, sqrt_upper)?,
        }
    } else {
        match input_token {
            InputToken::A => {
                get_liquidity_for_amount_a(input_amount, sqrt_price_current, sqrt_upper)?
            }
            InputToken::B => {
                get_liquidity_for_amount_b(input_amount, sqrt_lower, sqrt_price_current)?
            }
        }
    };

    let (token_est_a, token_est_b) = get_token_amounts_for_liquidity(
        liquidity_amount,
        sqrt_price_current,
        sqrt_lower,
        sqrt_upper,
    )?;

    Ok(IncreaseLiquidityQuote {
        liquidity_amount,
        token_est_a,
        token_est_b,
        token_max_a: with_slippage(token_est_a, slippage_bps)?,
        token_max_b: with_slippage(token_est_b, slippage_bps)?,
    })
}
