//! Minor unit amounts

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso};
use thiserror::Error;

/// Errors that can occur in minor unit arithmetic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    /// An amount overflowed the representable range.
    #[error("amount overflowed the representable range")]
    Overflow,
}

/// Converts a minor unit amount into an exact decimal.
#[must_use]
pub fn to_decimal(minor: i64) -> Decimal {
    Decimal::from(minor)
}

/// Rounds an exact decimal amount to whole minor units, midpoints away from
/// zero.
///
/// This is the single rounding point for a priced cart: discount and tax
/// components stay exact and only the final chargeable total passes through
/// here.
///
/// # Errors
///
/// - [`AmountError::Overflow`]: The rounded amount does not fit in an `i64`.
pub fn round_to_minor(amount: Decimal) -> Result<i64, AmountError> {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(AmountError::Overflow)
}

/// Formats a minor unit amount in the given ISO currency, e.g. `$29.99`.
///
/// Unknown currency codes fall back to the raw minor amount so display code
/// never fails.
#[must_use]
pub fn format_minor(minor: i64, currency_code: &str) -> String {
    match iso::find(currency_code) {
        Some(currency) => Money::from_minor(minor, currency).to_string(),
        None => format!("{minor} minor units"),
    }
}
