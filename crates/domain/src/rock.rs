//! ROCK purchase economics.
//!
//! Every ROCK minted by the Moai program costs [`ROCK_PRICE_LAMPORTS`] sent to
//! the escrow (wrapped SOL) plus [`ROCK_FEE_LAMPORTS`] sent to the buyer's
//! spending wallet to cover future transaction fees.

use crate::error::DomainError;
use crate::token::amount_to_ui_amount_string;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Lamports moved to escrow per ROCK (0.0099 SOL).
pub const ROCK_PRICE_LAMPORTS: u64 = 9_900_000;

/// Lamports moved to the spending wallet per ROCK (0.0001 SOL).
pub const ROCK_FEE_LAMPORTS: u64 = 100_000;

/// Decimals of the ROCK mint.
pub const ROCK_DECIMALS: u8 = 0;

/// Decimals of the MOAI mint.
pub const MOAI_DECIMALS: u8 = 9;

/// Lamport flows of a single `mint_rock` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RockPurchase {
    /// ROCK amount minted.
    pub amount: u64,
    /// Lamports wrapped into the escrow.
    pub escrow_lamports: u64,
    /// Lamports sent to the spending wallet.
    pub fee_lamports: u64,
}

impl RockPurchase {
    /// Computes the lamport flows for `amount` ROCK.
    pub fn new(amount: u64) -> Result<Self, DomainError> {
        let escrow_lamports = amount
            .checked_mul(ROCK_PRICE_LAMPORTS)
            .ok_or(DomainError::Overflow("rock escrow lamports"))?;
        let fee_lamports = amount
            .checked_mul(ROCK_FEE_LAMPORTS)
            .ok_or(DomainError::Overflow("rock fee lamports"))?;
        escrow_lamports
            .checked_add(fee_lamports)
            .ok_or(DomainError::Overflow("rock total lamports"))?;
        Ok(Self {
            amount,
            escrow_lamports,
            fee_lamports,
        })
    }

    /// Total lamports leaving the buyer, excluding rent and network fees.
    pub fn total_lamports(&self) -> u64 {
        // checked in `new`
        self.escrow_lamports + self.fee_lamports
    }

    /// Memo text the program records for this purchase.
    pub fn memo(&self, spending_wallet: impl Display) -> String {
        format!(
            "Minted {} $ROCK with {} SOL & keep {} SOL to spending wallet ({}) for tx fee in future. You can withdraw SOL in spending wallet any time",
            self.amount,
            amount_to_ui_amount_string(self.escrow_lamports, 9),
            amount_to_ui_amount_string(self.fee_lamports, 9),
            spending_wallet
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_flows() {
        let purchase = RockPurchase::new(19).unwrap();
        assert_eq!(purchase.escrow_lamports, 188_100_000);
        assert_eq!(purchase.fee_lamports, 1_900_000);
        assert_eq!(purchase.total_lamports(), 190_000_000);
    }

    #[test]
    fn test_purchase_overflow() {
        assert_eq!(
            RockPurchase::new(u64::MAX / 1000),
            Err(DomainError::Overflow("rock escrow lamports"))
        );
    }

    #[test]
    fn test_memo() {
        let memo = RockPurchase::new(19).unwrap().memo("Spend1ng");
        assert_eq!(
            memo,
            "Minted 19 $ROCK with 0.188100000 SOL & keep 0.001900000 SOL to spending wallet (Spend1ng) for tx fee in future. You can withdraw SOL in spending wallet any time"
        );
    }
}
