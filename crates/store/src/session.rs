//! Session
//!
//! Tracks who is signed in and owns the buyer-scoped stores. Signing in
//! rebinds the wishlist to the buyer's account; signing out resets every
//! store to a fresh guest state. Hydration order is cart first, then
//! wishlist, so a transport failure leaves at most the wishlist stale.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use liveshop::shipping::ShippingPolicy;

use crate::{
    cart::CartStore,
    checkout::{CheckoutError, CheckoutFlow},
    gateway::{GatewayError, StorefrontGateway},
    notify::Notifier,
    uuids::TypedUuid,
    wishlist::WishlistStore,
};

/// Identifies a [`Buyer`].
pub type BuyerUuid = TypedUuid<Buyer>;

/// A signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    /// Account identifier.
    pub uuid: BuyerUuid,

    /// Name shown in the storefront header.
    pub display_name: String,
}

/// One device's storefront session.
pub struct Session {
    gateway: Arc<dyn StorefrontGateway>,
    notifier: Notifier,
    buyer: Option<Buyer>,

    /// The shopping cart, guest- or account-scoped to match the session.
    pub cart: CartStore,

    /// The wishlist; inert until someone signs in.
    pub wishlist: WishlistStore,
}

impl Session {
    /// A fresh guest session.
    #[must_use]
    pub fn signed_out(gateway: Arc<dyn StorefrontGateway>, notifier: Notifier) -> Self {
        let cart = CartStore::new(Arc::clone(&gateway), notifier.clone());
        let wishlist = WishlistStore::new(Arc::clone(&gateway), notifier.clone(), None);

        Self {
            gateway,
            notifier,
            buyer: None,
            cart,
            wishlist,
        }
    }

    /// A session already bound to `buyer`.
    #[must_use]
    pub fn signed_in(
        gateway: Arc<dyn StorefrontGateway>,
        notifier: Notifier,
        buyer: Buyer,
    ) -> Self {
        let mut session = Self::signed_out(gateway, notifier);

        session.sign_in(buyer);

        session
    }

    /// The signed-in buyer, if any.
    #[must_use]
    pub fn buyer(&self) -> Option<&Buyer> {
        self.buyer.as_ref()
    }

    /// Whether someone is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.buyer.is_some()
    }

    /// Binds the session to `buyer`.
    ///
    /// The cart keeps its rows; the server merges the guest cart into the
    /// account on its side, and the next [`hydrate`] picks up the merged
    /// result. The wishlist rebinds to the account and starts empty until
    /// hydrated.
    ///
    /// [`hydrate`]: Session::hydrate
    pub fn sign_in(&mut self, buyer: Buyer) {
        self.wishlist = WishlistStore::new(
            Arc::clone(&self.gateway),
            self.notifier.clone(),
            Some(buyer.uuid),
        );
        self.buyer = Some(buyer);
    }

    /// Drops the buyer and resets both stores to a fresh guest state.
    pub fn sign_out(&mut self) {
        self.buyer = None;
        self.cart = CartStore::new(Arc::clone(&self.gateway), self.notifier.clone());
        self.wishlist = WishlistStore::new(Arc::clone(&self.gateway), self.notifier.clone(), None);
    }

    /// Refreshes both stores from the server.
    ///
    /// # Errors
    ///
    /// - [`GatewayError`]: The first transport failure; local state keeps
    ///   whatever was already loaded.
    pub async fn hydrate(&mut self) -> Result<(), GatewayError> {
        self.cart.hydrate().await?;
        self.wishlist.hydrate().await?;

        Ok(())
    }

    /// Starts checkout for the signed-in buyer.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Unauthenticated`]: Nobody is signed in.
    /// - [`CheckoutError::EmptyCart`]: There is nothing to buy.
    pub fn begin_checkout(
        &self,
        policy: ShippingPolicy,
        tax_rate: Decimal,
    ) -> Result<CheckoutFlow, CheckoutError> {
        if self.buyer.is_none() {
            return Err(CheckoutError::Unauthenticated);
        }

        CheckoutFlow::begin(
            &self.cart,
            policy,
            tax_rate,
            Arc::clone(&self.gateway),
            self.notifier.clone(),
        )
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Session")
            .field("buyer", &self.buyer)
            .field("cart", &self.cart)
            .field("wishlist", &self.wishlist)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use liveshop::fixtures;

    use crate::test::{InMemoryGateway, product_snapshot};

    use super::*;

    fn buyer() -> Buyer {
        Buyer {
            uuid: BuyerUuid::new(),
            display_name: "Priya".to_string(),
        }
    }

    fn session() -> (Session, Arc<InMemoryGateway>) {
        let gateway = Arc::new(InMemoryGateway::new());
        let (notifier, _notices) = Notifier::channel();
        let session = Session::signed_in(Arc::clone(&gateway), notifier, buyer());

        (session, gateway)
    }

    #[tokio::test]
    async fn test_sign_out_resets_both_stores() -> TestResult {
        let (mut session, gateway) = session();
        let tee = product_snapshot("Graphic Tee", 2999, 10);

        gateway.upsert_product(tee.clone());

        session.cart.add_item(&tee, 2).await?;
        session.wishlist.add(tee.uuid).await?;

        session.sign_out();

        assert!(!session.is_authenticated());
        assert!(session.cart.is_empty());
        assert!(session.wishlist.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_guest_sessions_cannot_check_out() -> TestResult {
        let (mut session, gateway) = session();
        let tee = product_snapshot("Graphic Tee", 2999, 10);

        gateway.upsert_product(tee.clone());

        session.cart.add_item(&tee, 1).await?;
        session.sign_out();
        session.cart.add_item(&tee, 1).await?;

        let result = session.begin_checkout(fixtures::standard_policy(), fixtures::standard_tax());

        assert!(matches!(result, Err(CheckoutError::Unauthenticated)));

        Ok(())
    }

    #[tokio::test]
    async fn test_hydrate_pulls_cart_and_wishlist() -> TestResult {
        let (mut first, gateway) = session();
        let tee = product_snapshot("Graphic Tee", 2999, 10);

        gateway.upsert_product(tee.clone());

        first.cart.add_item(&tee, 2).await?;
        first.wishlist.add(tee.uuid).await?;

        let (notifier, _notices) = Notifier::channel();
        let mut second = Session::signed_in(Arc::clone(&gateway), notifier, buyer());

        second.hydrate().await?;

        assert_eq!(second.cart.item_count(), 2);
        assert!(second.wishlist.contains(tee.uuid));

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_in_keeps_the_guest_cart() -> TestResult {
        let gateway = Arc::new(InMemoryGateway::new());
        let (notifier, _notices) = Notifier::channel();
        let mut session = Session::signed_out(Arc::clone(&gateway), notifier);
        let tee = product_snapshot("Graphic Tee", 2999, 10);

        gateway.upsert_product(tee.clone());

        session.cart.add_item(&tee, 2).await?;
        session.sign_in(buyer());

        assert!(session.is_authenticated());
        assert_eq!(session.cart.item_count(), 2);

        Ok(())
    }
}
