//! LiveShop storefront client core.
//!
//! The state the storefront UI renders from: a cart, a wishlist, and a
//! checkout flow, plus the HTTP gateway that keeps them in sync with the
//! hosted storefront API. Pricing itself lives in the [`liveshop`] crate;
//! this one owns state, synchronization, and the notification side channel
//! the UI observes.
//!
//! Mutations are optimistic. A store applies the change locally first, asks
//! the gateway to confirm it, and on failure rolls back to the last
//! confirmed state. Every state-changing operation reports its outcome
//! through [`notify::Notifier`] exactly once, so a UI (or a test) can treat
//! the notice stream as the operation log.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod errors;
pub mod gateway;
pub mod notify;
pub mod orders;
pub mod session;
pub mod wishlist;

mod uuids;

#[cfg(test)]
mod test;
