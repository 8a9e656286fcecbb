//! LiveShop pricing engine.
//!
//! Pure cart arithmetic for the LiveShop storefront: line items, promo code
//! validation, discount clamping, shipping policy, and the canonical totals
//! computation. There is no IO here; callers feed snapshots in and read a
//! priced cart out, so every result is reproducible from its inputs.
//!
//! Amounts are integer minor units (cents, paise). Intermediate results that
//! can carry fractions of a minor unit are kept as exact [`rust_decimal`]
//! decimals; rounding to a chargeable amount happens exactly once, in
//! [`totals::compute_totals`].

pub mod discounts;
pub mod fixtures;
pub mod lines;
pub mod money;
pub mod promos;
pub mod shipping;
pub mod totals;
