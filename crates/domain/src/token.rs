use crate::error::DomainError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Mint address of wrapped SOL.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

/// Decimals of the native mint.
pub const SOL_DECIMALS: u8 = 9;

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub mint: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(mint: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            mint: mint.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Wrapped SOL.
    pub fn sol() -> Self {
        Self::new(NATIVE_MINT, "SOL", SOL_DECIMALS)
    }

    /// Converts a UI amount into raw base units, truncating extra precision.
    pub fn to_raw(&self, ui_amount: Decimal) -> Result<u64, DomainError> {
        ui_to_raw(ui_amount, self.decimals)
    }
}

/// Renders a raw amount as a UI string, e.g. `188100000` with 9 decimals
/// becomes `0.188100000`.
pub fn amount_to_ui_amount_string(amount: u64, decimals: u8) -> String {
    let decimals = decimals as usize;
    if decimals == 0 {
        return amount.to_string();
    }
    // always keep one integer digit
    let mut s = format!("{:0width$}", amount, width = decimals + 1);
    s.insert(s.len() - decimals, '.');
    s
}

/// Converts a UI amount into raw base units.
pub fn ui_to_raw(ui_amount: Decimal, decimals: u8) -> Result<u64, DomainError> {
    if ui_amount.is_sign_negative() {
        return Err(DomainError::NegativeAmount);
    }
    let scale = 10u64
        .checked_pow(u32::from(decimals))
        .ok_or(DomainError::Overflow("ui_to_raw"))?;
    ui_amount
        .checked_mul(Decimal::from(scale))
        .and_then(|raw| raw.trunc().to_u64())
        .ok_or(DomainError::Overflow("ui_to_raw"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ui_amount_string() {
        assert_eq!(amount_to_ui_amount_string(188_100_000, 9), "0.188100000");
        assert_eq!(amount_to_ui_amount_string(1_000_000_000, 9), "1.000000000");
        assert_eq!(amount_to_ui_amount_string(5, 2), "0.05");
        assert_eq!(amount_to_ui_amount_string(0, 3), "0.000");
        assert_eq!(amount_to_ui_amount_string(19, 0), "19");
    }

    #[test]
    fn test_ui_to_raw() {
        assert_eq!(ui_to_raw(dec!(10), 9).unwrap(), 10 * LAMPORTS_PER_SOL);
        assert_eq!(ui_to_raw(dec!(0.5), 6).unwrap(), 500_000);
        assert_eq!(ui_to_raw(dec!(1.23456789), 2).unwrap(), 123);
        assert_eq!(ui_to_raw(dec!(-1), 9), Err(DomainError::NegativeAmount));
        assert!(ui_to_raw(dec!(100000000000), 9).is_err());
    }

    #[test]
    fn test_token_to_raw() {
        assert_eq!(Token::sol().to_raw(dec!(2)).unwrap(), 2 * LAMPORTS_PER_SOL);
        let usdc = Token::new("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USDC", 6);
        assert_eq!(usdc.to_raw(dec!(2)).unwrap(), 2_000_000);
    }
}
