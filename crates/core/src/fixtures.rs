//! Shared fixtures
//!
//! Canonical policies and promo codes used across the workspace's tests.

use rust_decimal::Decimal;

use crate::{discounts::Discount, lines::LineItem, promos::PromoCode, shipping::ShippingPolicy};

/// Standard shipping: 4.99 below 100.00, free above, express at 12.99.
#[must_use]
pub fn standard_policy() -> ShippingPolicy {
    ShippingPolicy {
        free_threshold: 10_000,
        flat_fee: 499,
        express_fee: 1299,
    }
}

/// The storefront's default 18% tax rate.
#[must_use]
pub fn standard_tax() -> Decimal {
    Decimal::new(18, 2)
}

/// `WELCOME10`: 10% off orders of 50.00 or more.
#[must_use]
pub fn welcome10() -> PromoCode {
    PromoCode {
        min_order: Some(5000),
        ..PromoCode::new("WELCOME10", Discount::Percentage(Decimal::from(10)))
    }
}

/// `SAVE20`: a flat 20.00 off any order.
#[must_use]
pub fn save20() -> PromoCode {
    PromoCode::new("SAVE20", Discount::Fixed(2000))
}

/// A small two-product cart: two units at 29.99 and a 12.50 book.
#[must_use]
pub fn sample_lines() -> Vec<LineItem> {
    vec![
        LineItem::new(2999, 2),
        LineItem::in_category(1250, 1, "books"),
    ]
}
