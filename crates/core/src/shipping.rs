//! Shipping

use serde::{Deserialize, Serialize};

/// How the order ships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryOption {
    /// Flat fee delivery, free at or above the policy threshold.
    #[default]
    Standard,

    /// Priority delivery at a fixed fee, regardless of subtotal.
    Express,
}

/// Storefront shipping fees, all in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingPolicy {
    /// Subtotal at or above which standard delivery is free.
    pub free_threshold: i64,

    /// Standard delivery fee below the threshold.
    pub flat_fee: i64,

    /// Express delivery fee; the free threshold does not apply to it.
    pub express_fee: i64,
}

impl ShippingPolicy {
    /// Shipping charge for a subtotal under this policy.
    #[must_use]
    pub fn fee(&self, subtotal: i64, delivery: DeliveryOption) -> i64 {
        match delivery {
            DeliveryOption::Express => self.express_fee,
            DeliveryOption::Standard if subtotal >= self.free_threshold => 0,
            DeliveryOption::Standard => self.flat_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: ShippingPolicy = ShippingPolicy {
        free_threshold: 10_000,
        flat_fee: 499,
        express_fee: 1299,
    };

    #[test]
    fn test_standard_fee_below_threshold() {
        assert_eq!(POLICY.fee(9999, DeliveryOption::Standard), 499);
    }

    #[test]
    fn test_standard_is_free_at_and_above_threshold() {
        assert_eq!(POLICY.fee(10_000, DeliveryOption::Standard), 0);
        assert_eq!(POLICY.fee(25_000, DeliveryOption::Standard), 0);
    }

    #[test]
    fn test_express_fee_ignores_the_free_threshold() {
        assert_eq!(POLICY.fee(500, DeliveryOption::Express), 1299);
        assert_eq!(POLICY.fee(25_000, DeliveryOption::Express), 1299);
    }
}
