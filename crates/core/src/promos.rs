//! Promo codes

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::discounts::Discount;

/// Why a promo code refused to apply.
///
/// A code that cannot apply is always an explicit rejection; it never
/// silently contributes a zero discount.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PromoRejection {
    /// The validity window has not opened yet.
    #[error("code is not active yet")]
    NotYetActive,

    /// The validity window has closed.
    #[error("code has expired")]
    Expired,

    /// The code has been redeemed its global maximum number of times.
    #[error("code has reached its redemption limit")]
    Exhausted,

    /// This buyer has redeemed the code its per-buyer maximum number of times.
    #[error("code has already been used the maximum number of times")]
    UserLimitReached,

    /// The cart subtotal is below the code's minimum order amount.
    #[error("order subtotal does not meet the minimum of {required}")]
    BelowMinimum {
        /// Minimum subtotal in minor units.
        required: i64,
    },

    /// Nothing in the cart is in a category the code applies to.
    #[error("code does not apply to anything in the cart")]
    CategoryMismatch,
}

/// A promo code definition as served by the promotions endpoint.
///
/// The definition alone never decides applicability; [`check_usable`] and
/// [`amount_for`] do, against an explicit clock and cart.
///
/// [`check_usable`]: PromoCode::check_usable
/// [`amount_for`]: PromoCode::amount_for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    /// The code buyers type in; matched case-insensitively.
    pub code: String,

    /// What the code takes off the subtotal.
    pub discount: Discount,

    /// Minimum cart subtotal (minor units) before the code applies.
    pub min_order: Option<i64>,

    /// Start of the validity window, inclusive.
    pub valid_from: Option<Timestamp>,

    /// End of the validity window, inclusive.
    pub valid_until: Option<Timestamp>,

    /// Global redemption cap across all buyers.
    pub max_uses: Option<u32>,

    /// Redemptions so far across all buyers.
    pub used_count: u32,

    /// Per-buyer redemption cap.
    pub max_uses_per_user: Option<u32>,

    /// Categories the code applies to; empty applies to every cart.
    pub categories: Vec<String>,
}

impl PromoCode {
    /// Creates an always-valid code with no caps or minimum.
    #[must_use]
    pub fn new(code: impl Into<String>, discount: Discount) -> Self {
        Self {
            code: code.into().to_uppercase(),
            discount,
            min_order: None,
            valid_from: None,
            valid_until: None,
            max_uses: None,
            used_count: 0,
            max_uses_per_user: None,
            categories: Vec::new(),
        }
    }

    /// Whether `candidate` names this code, ignoring case and surrounding
    /// whitespace.
    #[must_use]
    pub fn matches_code(&self, candidate: &str) -> bool {
        self.code.eq_ignore_ascii_case(candidate.trim())
    }

    /// Checks the cart-independent constraints: validity window, global cap,
    /// and this buyer's own redemption count.
    ///
    /// # Errors
    ///
    /// - [`PromoRejection::NotYetActive`]: `now` is before the window opens.
    /// - [`PromoRejection::Expired`]: `now` is after the window closes.
    /// - [`PromoRejection::Exhausted`]: The global redemption cap is reached.
    /// - [`PromoRejection::UserLimitReached`]: This buyer's cap is reached.
    pub fn check_usable(&self, now: Timestamp, buyer_uses: u32) -> Result<(), PromoRejection> {
        if let Some(from) = self.valid_from
            && now < from
        {
            return Err(PromoRejection::NotYetActive);
        }

        if let Some(until) = self.valid_until
            && now > until
        {
            return Err(PromoRejection::Expired);
        }

        if let Some(cap) = self.max_uses
            && self.used_count >= cap
        {
            return Err(PromoRejection::Exhausted);
        }

        if let Some(cap) = self.max_uses_per_user
            && buyer_uses >= cap
        {
            return Err(PromoRejection::UserLimitReached);
        }

        Ok(())
    }

    /// Checks the cart-dependent constraints and produces the exact discount
    /// amount for `subtotal`.
    ///
    /// Category-restricted codes need at least one cart row in one of their
    /// categories. The amount is clamped by [`Discount::amount`].
    ///
    /// # Errors
    ///
    /// - [`PromoRejection::CategoryMismatch`]: No cart row is in an eligible
    ///   category.
    /// - [`PromoRejection::BelowMinimum`]: The subtotal is under the code's
    ///   minimum order amount.
    pub fn amount_for(
        &self,
        subtotal: i64,
        cart_categories: &[&str],
    ) -> Result<Decimal, PromoRejection> {
        if !self.applies_to(cart_categories) {
            return Err(PromoRejection::CategoryMismatch);
        }

        if let Some(required) = self.min_order
            && subtotal < required
        {
            return Err(PromoRejection::BelowMinimum { required });
        }

        Ok(self.discount.amount(subtotal))
    }

    fn applies_to(&self, cart_categories: &[&str]) -> bool {
        self.categories.is_empty()
            || cart_categories
                .iter()
                .any(|category| self.categories.iter().any(|eligible| eligible == category))
    }
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use super::*;

    fn welcome10() -> PromoCode {
        PromoCode {
            min_order: Some(5000),
            ..PromoCode::new("WELCOME10", Discount::Percentage(Decimal::from(10)))
        }
    }

    #[test]
    fn test_code_matching_is_case_insensitive() {
        let promo = welcome10();

        assert!(promo.matches_code("welcome10"));
        assert!(promo.matches_code("  WELCOME10 "));
        assert!(!promo.matches_code("WELCOME15"));
    }

    #[test]
    fn test_validity_window() -> TestResult {
        let now = Timestamp::now();

        let promo = PromoCode {
            valid_from: Some(now - 1.hour()),
            valid_until: Some(now + 1.hour()),
            ..welcome10()
        };

        promo.check_usable(now, 0)?;

        assert!(matches!(
            promo.check_usable(now - 2.hours(), 0),
            Err(PromoRejection::NotYetActive)
        ));
        assert!(matches!(
            promo.check_usable(now + 2.hours(), 0),
            Err(PromoRejection::Expired)
        ));

        Ok(())
    }

    #[test]
    fn test_redemption_caps() -> TestResult {
        let now = Timestamp::now();

        let promo = PromoCode {
            max_uses: Some(100),
            used_count: 100,
            ..welcome10()
        };

        assert!(matches!(
            promo.check_usable(now, 0),
            Err(PromoRejection::Exhausted)
        ));

        let promo = PromoCode {
            max_uses: Some(100),
            used_count: 99,
            max_uses_per_user: Some(1),
            ..welcome10()
        };

        promo.check_usable(now, 0)?;

        assert!(matches!(
            promo.check_usable(now, 1),
            Err(PromoRejection::UserLimitReached)
        ));

        Ok(())
    }

    #[test]
    fn test_minimum_order_is_an_explicit_rejection() -> TestResult {
        let promo = welcome10();

        assert_eq!(promo.amount_for(5998, &[])?, Decimal::new(5998, 1));
        assert!(matches!(
            promo.amount_for(4000, &[]),
            Err(PromoRejection::BelowMinimum { required: 5000 })
        ));

        Ok(())
    }

    #[test]
    fn test_category_restricted_code_needs_an_eligible_row() -> TestResult {
        let promo = PromoCode {
            categories: vec!["electronics".to_string()],
            ..PromoCode::new("TECH5", Discount::Percentage(Decimal::from(5)))
        };

        assert!(matches!(
            promo.amount_for(10_000, &["books"]),
            Err(PromoRejection::CategoryMismatch)
        ));

        let amount = promo.amount_for(10_000, &["books", "electronics"])?;

        assert_eq!(amount, Decimal::new(500, 0));

        Ok(())
    }
}
