//! Storefront gateway
//!
//! The port between the client-side stores and the hosted storefront API.
//! Stores talk to [`StorefrontGateway`]; production wires in the
//! [`HttpGateway`], tests wire in a mock or an in-memory double.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use liveshop::promos::PromoCode;

use crate::{
    cart::{CartLine, LineUuid},
    catalog::{ProductSnapshot, ProductUuid},
    orders::{Order, OrderAdminUpdate, OrderDraft, OrderUuid},
    wishlist::WishlistEntry,
};

mod http;

pub use http::{HttpGateway, HttpGatewayConfig, REQUEST_TIMEOUT};

/// Errors surfaced by a storefront gateway.
///
/// Variants carry display-ready text rather than transport internals so
/// stores and tests can match on them without a live HTTP stack behind them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The session token is missing, expired, or revoked.
    #[error("not signed in")]
    Unauthenticated,

    /// The resource does not exist on the server.
    #[error("not found")]
    NotFound,

    /// The server understood the request and refused it.
    #[error("{0}")]
    Rejected(String),

    /// The request never completed: connection failure or timeout.
    #[error("network failure: {0}")]
    Network(String),

    /// The server answered with something outside the API contract.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// A promo definition joined with the calling buyer's own redemption count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPromo {
    /// The code as configured.
    pub promo: PromoCode,

    /// How many times this buyer has already redeemed it.
    pub buyer_uses: u32,
}

/// Everything the stores need from the storefront API.
///
/// Cart mutations return the server's confirmed line so callers can
/// reconcile optimistic state against it. `quantity` arguments are the
/// resulting line quantity, not a delta.
#[automock]
#[async_trait]
pub trait StorefrontGateway: Send + Sync {
    /// Fetches the server's current cart.
    async fn cart_snapshot(&self) -> Result<Vec<CartLine>, GatewayError>;

    /// Creates or merges a line so the product sits at `quantity` units.
    async fn add_cart_line(
        &self,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartLine, GatewayError>;

    /// Sets an existing line to `quantity` units.
    async fn update_cart_line(
        &self,
        line: LineUuid,
        quantity: u32,
    ) -> Result<CartLine, GatewayError>;

    /// Removes a line. The server answers not-found for a line that is
    /// already gone.
    async fn remove_cart_line(&self, line: LineUuid) -> Result<(), GatewayError>;

    /// Removes every line.
    async fn clear_cart(&self) -> Result<(), GatewayError>;

    /// Fetches the buyer's wishlist, oldest first.
    async fn wishlist(&self) -> Result<Vec<WishlistEntry>, GatewayError>;

    /// Saves a product to the wishlist.
    async fn add_wishlist(&self, product: ProductUuid) -> Result<WishlistEntry, GatewayError>;

    /// Removes a product from the wishlist.
    async fn remove_wishlist(&self, product: ProductUuid) -> Result<(), GatewayError>;

    /// Fetches one product.
    async fn product(&self, product: ProductUuid) -> Result<ProductSnapshot, GatewayError>;

    /// Looks up a promo code with the caller's redemption count.
    async fn promo(&self, code: String) -> Result<FetchedPromo, GatewayError>;

    /// Creates an order from a reviewed cart.
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, GatewayError>;

    /// Applies an administrative status or tracking update.
    async fn update_order(
        &self,
        order: OrderUuid,
        update: OrderAdminUpdate,
    ) -> Result<Order, GatewayError>;
}
