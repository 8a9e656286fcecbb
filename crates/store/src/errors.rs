//! Store errors

use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors that can occur while mutating the cart.
///
/// Local precondition failures ([`InvalidQuantity`],
/// [`InsufficientInventory`]) are caught before any request is made; sync
/// failures mean the optimistic change was rolled back.
///
/// [`InvalidQuantity`]: CartError::InvalidQuantity
/// [`InsufficientInventory`]: CartError::InsufficientInventory
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested quantity was zero.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The product does not have enough stock for the requested quantity.
    #[error("only {available} left in stock")]
    InsufficientInventory {
        /// Units the catalog says are available.
        available: u32,
    },

    /// The targeted line is not in the cart, locally or on the server.
    #[error("cart line not found")]
    LineNotFound,

    /// The server rejected or never received the mutation; local state was
    /// rolled back.
    #[error("cart could not be synced")]
    Sync(#[source] GatewayError),
}

/// Errors that can occur while mutating the wishlist.
///
/// Benign outcomes (not signed in, already saved) are not errors; see
/// [`WishlistStore::add`](crate::wishlist::WishlistStore::add).
#[derive(Debug, Error)]
pub enum WishlistError {
    /// The server rejected or never received the mutation; local state was
    /// rolled back.
    #[error("wishlist could not be synced")]
    Sync(#[source] GatewayError),
}
