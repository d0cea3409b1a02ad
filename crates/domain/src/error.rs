use thiserror::Error;

/// Errors raised by the pure domain helpers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("price must be positive")]
    NonPositivePrice,
    #[error("amount must not be negative")]
    NegativeAmount,
    #[error("tick spacing must be positive")]
    InvalidTickSpacing,
    #[error("sqrt price {0} is out of bounds")]
    SqrtPriceOutOfBounds(u128),
    #[error("tick index {0} is out of bounds")]
    TickOutOfBounds(i32),
    #[error("start tick index {0} is out of bounds")]
    StartTickOutOfBounds(i32),
    #[error("price range is empty")]
    EmptyRange,
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    #[error("{field} is {len} bytes, limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}
