//! Totals

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    lines::{self, LineItem},
    money::{self, AmountError},
    promos::{PromoCode, PromoRejection},
    shipping::{DeliveryOption, ShippingPolicy},
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TotalsError {
    /// The promo code refused to apply to this cart.
    #[error(transparent)]
    Promo(#[from] PromoRejection),

    /// A money amount overflowed.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// The tax rate is outside `[0, 1]`.
    #[error("tax rate {0} is not between 0 and 1")]
    InvalidTaxRate(Decimal),
}

/// A priced cart: every component of the final charge.
///
/// `subtotal` and `shipping` are whole minor units. `discount` and `tax` are
/// exact decimals that may carry fractions of a minor unit; they are reported
/// unrounded so the components always re-derive the total. `total` is the
/// only rounded figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of row totals, in minor units.
    pub subtotal: i64,

    /// Promo discount in exact minor units; zero without a promo.
    pub discount: Decimal,

    /// Shipping charge in minor units.
    pub shipping: i64,

    /// Tax on the discounted subtotal, in exact minor units.
    pub tax: Decimal,

    /// The chargeable amount: `subtotal - discount + shipping + tax`, rounded
    /// to whole minor units, midpoints away from zero.
    pub total: i64,

    /// Total units across all rows.
    pub item_count: u64,
}

/// Prices a cart.
///
/// The discount comes from `promo` applied to the subtotal; a code that
/// cannot apply is an error, never a silent zero. Shipping follows `policy`
/// for the chosen delivery option. Tax applies to the discounted subtotal
/// only; shipping is never taxed. All components stay exact and the final
/// total is rounded exactly once.
///
/// Validity windows and redemption caps are buyer- and clock-dependent, so
/// they are checked separately via [`PromoCode::check_usable`]; this function
/// stays deterministic in its inputs.
///
/// # Errors
///
/// - [`TotalsError::Promo`]: The promo code rejected this cart.
/// - [`TotalsError::Amount`]: An amount overflowed.
/// - [`TotalsError::InvalidTaxRate`]: `tax_rate` is outside `[0, 1]`.
pub fn compute_totals(
    items: &[LineItem],
    promo: Option<&PromoCode>,
    policy: &ShippingPolicy,
    delivery: DeliveryOption,
    tax_rate: Decimal,
) -> Result<Totals, TotalsError> {
    if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE {
        return Err(TotalsError::InvalidTaxRate(tax_rate));
    }

    let subtotal = lines::subtotal(items)?;

    let discount = match promo {
        Some(code) => {
            let categories: Vec<&str> = items
                .iter()
                .filter_map(|item| item.category.as_deref())
                .collect();

            code.amount_for(subtotal, &categories)?
        }
        None => Decimal::ZERO,
    };

    let shipping = policy.fee(subtotal, delivery);

    let taxable = money::to_decimal(subtotal) - discount;
    let tax = taxable * tax_rate;

    let total = money::round_to_minor(taxable + money::to_decimal(shipping) + tax)?;

    Ok(Totals {
        subtotal,
        discount,
        shipping,
        tax,
        total,
        item_count: lines::item_count(items),
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{discounts::Discount, fixtures};

    use super::*;

    #[test]
    fn test_components_add_up_to_the_total() -> TestResult {
        let items = fixtures::sample_lines();

        let totals = compute_totals(
            &items,
            Some(&fixtures::welcome10()),
            &fixtures::standard_policy(),
            DeliveryOption::Standard,
            fixtures::standard_tax(),
        )?;

        assert_eq!(totals.subtotal, 7248);
        assert_eq!(totals.discount, Decimal::new(7248, 1));
        assert_eq!(totals.shipping, 499);
        assert_eq!(totals.item_count, 3);

        let exact = money::to_decimal(totals.subtotal) - totals.discount
            + money::to_decimal(totals.shipping)
            + totals.tax;

        assert_eq!(totals.total, money::round_to_minor(exact)?);

        Ok(())
    }

    #[test]
    fn test_tax_applies_after_discount_and_never_to_shipping() -> TestResult {
        let items = [LineItem::new(10_000, 1)];

        let policy = ShippingPolicy {
            free_threshold: 50_000,
            flat_fee: 499,
            express_fee: 1299,
        };

        let totals = compute_totals(
            &items,
            Some(&fixtures::save20()),
            &policy,
            DeliveryOption::Standard,
            Decimal::new(10, 2),
        )?;

        // Tax is 10% of 8000, not of 8499 or 10000.
        assert_eq!(totals.tax, Decimal::new(800, 0));
        assert_eq!(totals.total, 8000 + 499 + 800);

        Ok(())
    }

    #[test]
    fn test_total_is_rounded_once_at_the_end() -> TestResult {
        // 10% of 1005 is 100.5 exactly. Rounding the discount on its own
        // would charge 904; carrying it exact and rounding the sum charges
        // 905.
        let items = [LineItem::new(335, 3)];

        let promo = PromoCode::new("TEN", Discount::Percentage(Decimal::from(10)));

        let policy = ShippingPolicy {
            free_threshold: 0,
            flat_fee: 0,
            express_fee: 0,
        };

        let totals = compute_totals(
            &items,
            Some(&promo),
            &policy,
            DeliveryOption::Standard,
            Decimal::ZERO,
        )?;

        assert_eq!(totals.discount, Decimal::new(1005, 1));
        assert_eq!(totals.total, 905);

        Ok(())
    }

    #[test]
    fn test_below_minimum_promo_is_an_error_not_a_zero_discount() {
        let items = [LineItem::new(4000, 1)];

        let result = compute_totals(
            &items,
            Some(&fixtures::welcome10()),
            &fixtures::standard_policy(),
            DeliveryOption::Standard,
            fixtures::standard_tax(),
        );

        assert!(matches!(
            result,
            Err(TotalsError::Promo(PromoRejection::BelowMinimum {
                required: 5000
            }))
        ));
    }

    #[test]
    fn test_express_delivery_charges_even_above_the_free_threshold() -> TestResult {
        let items = [LineItem::new(25_000, 1)];

        let totals = compute_totals(
            &items,
            None,
            &fixtures::standard_policy(),
            DeliveryOption::Express,
            Decimal::ZERO,
        )?;

        assert_eq!(totals.shipping, 1299);
        assert_eq!(totals.total, 26_299);

        Ok(())
    }

    #[test]
    fn test_tax_rate_outside_unit_interval_is_rejected() {
        let items = [LineItem::new(1000, 1)];

        let result = compute_totals(
            &items,
            None,
            &fixtures::standard_policy(),
            DeliveryOption::Standard,
            Decimal::new(15, 1),
        );

        assert!(matches!(result, Err(TotalsError::InvalidTaxRate(_))));
    }
}
