//! Line items

use serde::{Deserialize, Serialize};

use crate::money::AmountError;

/// One priced row of a cart or order: a unit price snapshot at a quantity.
///
/// The unit price is whatever the catalog said when the row was created; the
/// calculator never reaches back into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Unit price in minor units.
    pub unit_price: i64,

    /// Units on this row; always at least one in a live cart.
    pub quantity: u32,

    /// Catalog category of the underlying product, when known.
    pub category: Option<String>,
}

impl LineItem {
    /// Creates a line item with no category.
    #[must_use]
    pub const fn new(unit_price: i64, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
            category: None,
        }
    }

    /// Creates a line item in a catalog category.
    #[must_use]
    pub fn in_category(unit_price: i64, quantity: u32, category: impl Into<String>) -> Self {
        Self {
            unit_price,
            quantity,
            category: Some(category.into()),
        }
    }

    /// Price of the whole row in minor units.
    ///
    /// # Errors
    ///
    /// - [`AmountError::Overflow`]: The multiplication does not fit in an `i64`.
    pub fn line_total(&self) -> Result<i64, AmountError> {
        self.unit_price
            .checked_mul(i64::from(self.quantity))
            .ok_or(AmountError::Overflow)
    }
}

/// Sums every row total into a cart subtotal, in minor units.
///
/// An empty slice is a zero subtotal.
///
/// # Errors
///
/// - [`AmountError::Overflow`]: A row total or the running sum does not fit in
///   an `i64`.
pub fn subtotal(items: &[LineItem]) -> Result<i64, AmountError> {
    items.iter().try_fold(0_i64, |acc, item| {
        acc.checked_add(item.line_total()?)
            .ok_or(AmountError::Overflow)
    })
}

/// Total number of units across all rows.
#[must_use]
pub fn item_count(items: &[LineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}
