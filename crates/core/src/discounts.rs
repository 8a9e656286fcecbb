//! Discounts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money;

/// A discount as configured on a promo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Discount {
    /// Takes a percentage off the cart subtotal. The rate itself can be
    /// fractional (12.5%), so it stays a decimal.
    Percentage(Decimal),

    /// Takes a fixed minor unit amount off the cart subtotal.
    Fixed(i64),
}

impl Discount {
    /// Discount amount for a subtotal, in exact minor units.
    ///
    /// The result is clamped to `[0, subtotal]`: a fixed discount larger than
    /// the subtotal stops at the subtotal, and a percentage above 100 behaves
    /// like 100. Percentage amounts may carry fractions of a minor unit;
    /// rounding happens once, in the totals computation.
    #[must_use]
    pub fn amount(&self, subtotal: i64) -> Decimal {
        let subtotal = money::to_decimal(subtotal);

        let amount = match self {
            Self::Percentage(percent) => subtotal * *percent / Decimal::ONE_HUNDRED,
            Self::Fixed(minor) => money::to_decimal(*minor),
        };

        amount.min(subtotal).max(Decimal::ZERO)
    }
}
