//! Wishlist

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{
    cart::CartStore,
    catalog::{ProductSnapshot, ProductUuid},
    errors::{CartError, WishlistError},
    gateway::{GatewayError, StorefrontGateway},
    notify::Notifier,
    session::BuyerUuid,
};

/// One saved product.
///
/// `added_at` is set once, when the entry is first saved; the server's
/// timestamp is canonical and the optimistic local one is replaced by it on
/// confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    /// The saved product.
    pub product_uuid: ProductUuid,

    /// When the product was first saved.
    pub added_at: Timestamp,
}

/// The wishlist state container.
///
/// Entries keep their insertion order; a membership index answers
/// [`contains`] without scanning. Saving requires a signed-in buyer, but
/// that is a benign outcome rather than an error so UI code can route it to
/// a sign-in prompt.
///
/// [`contains`]: WishlistStore::contains
pub struct WishlistStore {
    gateway: Arc<dyn StorefrontGateway>,
    notifier: Notifier,
    buyer: Option<BuyerUuid>,
    entries: Vec<WishlistEntry>,
    index: FxHashSet<ProductUuid>,
}

impl WishlistStore {
    /// Creates an empty wishlist for `buyer`; `None` is a signed-out
    /// session.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn StorefrontGateway>,
        notifier: Notifier,
        buyer: Option<BuyerUuid>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            buyer,
            entries: Vec::new(),
            index: FxHashSet::default(),
        }
    }

    /// Saved entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[WishlistEntry] {
        &self.entries
    }

    /// Whether the product is saved, per the optimistic local state.
    #[must_use]
    pub fn contains(&self, product: ProductUuid) -> bool {
        self.index.contains(&product)
    }

    /// Number of saved products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Saves a product.
    ///
    /// Returns `Ok(true)` when the product was saved. `Ok(false)` covers the
    /// two benign no-ops: not signed in (a warning notice points the buyer
    /// at sign-in) and already saved (an informational notice).
    ///
    /// # Errors
    ///
    /// - [`WishlistError::Sync`]: The gateway failed; the optimistic entry
    ///   was removed again.
    pub async fn add(&mut self, product: ProductUuid) -> Result<bool, WishlistError> {
        if self.buyer.is_none() {
            self.notifier.warning("Sign in to save items for later");

            return Ok(false);
        }

        if self.contains(product) {
            self.notifier.info("Already in your wishlist");

            return Ok(false);
        }

        self.entries.push(WishlistEntry {
            product_uuid: product,
            added_at: Timestamp::now(),
        });
        self.index.insert(product);

        let result = self.gateway.add_wishlist(product).await;

        match result {
            Ok(confirmed) => {
                if let Some(entry) = self
                    .entries
                    .iter_mut()
                    .find(|entry| entry.product_uuid == product)
                {
                    entry.added_at = confirmed.added_at;
                }

                self.notifier.success("Added to your wishlist");

                Ok(true)
            }
            Err(error) => {
                self.entries.retain(|entry| entry.product_uuid != product);
                self.index.remove(&product);
                self.notifier
                    .error(format!("Could not save to your wishlist: {error}"));

                Err(WishlistError::Sync(error))
            }
        }
    }

    /// Removes a saved product.
    ///
    /// Returns `Ok(false)` when the product was not saved to begin with. On
    /// a failed confirmation the entry returns to its original position, so
    /// the list order the buyer sees stays stable.
    ///
    /// # Errors
    ///
    /// - [`WishlistError::Sync`]: The gateway failed; the entry was
    ///   restored.
    pub async fn remove(&mut self, product: ProductUuid) -> Result<bool, WishlistError> {
        let Some(position) = self
            .entries
            .iter()
            .position(|entry| entry.product_uuid == product)
        else {
            return Ok(false);
        };

        let entry = self.entries.remove(position);
        self.index.remove(&product);

        let result = self.gateway.remove_wishlist(product).await;

        match result {
            Ok(()) | Err(GatewayError::NotFound) => {
                self.notifier.success("Removed from your wishlist");

                Ok(true)
            }
            Err(error) => {
                let at = position.min(self.entries.len());

                self.entries.insert(at, entry);
                self.index.insert(product);
                self.notifier
                    .error(format!("Could not update your wishlist: {error}"));

                Err(WishlistError::Sync(error))
            }
        }
    }

    /// Saves or removes based on current membership, returning the resulting
    /// membership.
    ///
    /// Taking `&mut self` for the whole call means two toggles of the same
    /// product cannot interleave.
    ///
    /// # Errors
    ///
    /// - [`WishlistError::Sync`]: The underlying save or removal failed and
    ///   was rolled back.
    pub async fn toggle(&mut self, product: ProductUuid) -> Result<bool, WishlistError> {
        if self.contains(product) {
            self.remove(product).await?;

            Ok(false)
        } else {
            self.add(product).await
        }
    }

    /// Moves a saved product into the cart.
    ///
    /// The wishlist entry goes away only once the cart add has been
    /// confirmed; a failed add leaves the wishlist untouched. A failed
    /// wishlist removal after a successful add keeps the entry and reports
    /// it, which the next sync resolves.
    ///
    /// # Errors
    ///
    /// - [`CartError`]: The cart add failed; the wishlist is unchanged.
    pub async fn move_to_cart(
        &mut self,
        product: &ProductSnapshot,
        cart: &mut CartStore,
    ) -> Result<(), CartError> {
        cart.add_item(product, 1).await?;

        _ = self.remove(product.uuid).await;

        Ok(())
    }

    /// Replaces local state with the server's wishlist.
    ///
    /// A signed-out session has no server-side wishlist; this is then a
    /// local reset.
    ///
    /// # Errors
    ///
    /// - [`GatewayError`]: The wishlist could not be fetched; local state is
    ///   untouched.
    pub async fn hydrate(&mut self) -> Result<(), GatewayError> {
        if self.buyer.is_none() {
            self.entries.clear();
            self.index.clear();

            return Ok(());
        }

        let entries = self.gateway.wishlist().await?;

        self.index = entries.iter().map(|entry| entry.product_uuid).collect();
        self.entries = entries;

        Ok(())
    }
}

impl Debug for WishlistStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("WishlistStore")
            .field("buyer", &self.buyer)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{notify::NoticeKind, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn test_add_requires_a_signed_in_buyer() -> TestResult {
        let mut ctx = TestContext::anonymous();
        let tee = ctx.seed_product("Graphic Tee", 2999, 10);

        let added = ctx.wishlist.add(tee.uuid).await?;

        assert!(!added);
        assert!(ctx.wishlist.is_empty());
        assert!(ctx.gateway.server_wishlist().is_empty());

        let notices = ctx.drain_notices();

        assert_eq!(notices.len(), 1);
        assert_eq!(notices.first().map(|n| n.kind), Some(NoticeKind::Warning));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_saves_and_reports_success() -> TestResult {
        let mut ctx = TestContext::new();
        let tee = ctx.seed_product("Graphic Tee", 2999, 10);

        let added = ctx.wishlist.add(tee.uuid).await?;

        assert!(added);
        assert!(ctx.wishlist.contains(tee.uuid));
        assert_eq!(ctx.gateway.server_wishlist().len(), 1);

        let notices = ctx.drain_notices();

        assert_eq!(notices.first().map(|n| n.kind), Some(NoticeKind::Success));

        Ok(())
    }

    #[tokio::test]
    async fn test_adding_twice_is_a_benign_no_op() -> TestResult {
        let mut ctx = TestContext::new();
        let tee = ctx.seed_product("Graphic Tee", 2999, 10);

        ctx.wishlist.add(tee.uuid).await?;
        ctx.drain_notices();

        let added = ctx.wishlist.add(tee.uuid).await?;

        assert!(!added);
        assert_eq!(ctx.wishlist.len(), 1);

        let notices = ctx.drain_notices();

        assert_eq!(notices.first().map(|n| n.kind), Some(NoticeKind::Info));

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_removal_restores_the_entry_in_place() -> TestResult {
        let mut ctx = TestContext::new();
        let first = ctx.seed_product("Graphic Tee", 2999, 10);
        let second = ctx.seed_product("Desk Lamp", 4500, 5);
        let third = ctx.seed_product("Notebook", 899, 20);

        ctx.wishlist.add(first.uuid).await?;
        ctx.wishlist.add(second.uuid).await?;
        ctx.wishlist.add(third.uuid).await?;
        ctx.drain_notices();

        ctx.gateway.set_offline(true);

        let result = ctx.wishlist.remove(second.uuid).await;

        assert!(matches!(result, Err(WishlistError::Sync(_))));

        let order: Vec<ProductUuid> = ctx
            .wishlist
            .entries()
            .iter()
            .map(|entry| entry.product_uuid)
            .collect();

        assert_eq!(
            order,
            vec![first.uuid, second.uuid, third.uuid],
            "rollback must not reorder the list"
        );
        assert!(ctx.wishlist.contains(second.uuid));

        let notices = ctx.drain_notices();

        assert_eq!(notices.len(), 1, "one operation, one notice");
        assert_eq!(notices.first().map(|n| n.kind), Some(NoticeKind::Error));

        Ok(())
    }

    #[tokio::test]
    async fn test_removing_an_absent_product_is_a_silent_no_op() -> TestResult {
        let mut ctx = TestContext::new();
        let tee = ctx.seed_product("Graphic Tee", 2999, 10);

        let removed = ctx.wishlist.remove(tee.uuid).await?;

        assert!(!removed);
        assert!(ctx.drain_notices().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_alternates_membership() -> TestResult {
        let mut ctx = TestContext::new();
        let tee = ctx.seed_product("Graphic Tee", 2999, 10);

        assert!(ctx.wishlist.toggle(tee.uuid).await?);
        assert!(ctx.wishlist.contains(tee.uuid));

        assert!(!ctx.wishlist.toggle(tee.uuid).await?);
        assert!(!ctx.wishlist.contains(tee.uuid));
        assert!(ctx.gateway.server_wishlist().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_move_to_cart_removes_the_entry_after_the_add_confirms() -> TestResult {
        let mut ctx = TestContext::new();
        let tee = ctx.seed_product("Graphic Tee", 2999, 10);

        ctx.wishlist.add(tee.uuid).await?;
        ctx.drain_notices();

        let (mut wishlist, mut cart) = (ctx.wishlist, ctx.cart);

        wishlist.move_to_cart(&tee, &mut cart).await?;

        assert!(!wishlist.contains(tee.uuid));
        assert_eq!(cart.item_count(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_move_to_cart_keeps_the_entry_when_the_add_fails() -> TestResult {
        let mut ctx = TestContext::new();
        let gone = ctx.seed_product("Sold Out Lamp", 4500, 0);

        ctx.wishlist.add(gone.uuid).await?;
        ctx.drain_notices();

        let (mut wishlist, mut cart) = (ctx.wishlist, ctx.cart);

        let result = wishlist.move_to_cart(&gone, &mut cart).await;

        assert!(matches!(
            result,
            Err(CartError::InsufficientInventory { available: 0 })
        ));
        assert!(wishlist.contains(gone.uuid), "the entry must survive");
        assert!(cart.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_hydrate_rebuilds_the_membership_index() -> TestResult {
        let mut ctx = TestContext::new();
        let tee = ctx.seed_product("Graphic Tee", 2999, 10);

        ctx.wishlist.add(tee.uuid).await?;

        let (notifier, _notices) = Notifier::channel();
        let mut other = WishlistStore::new(ctx.gateway.clone(), notifier, Some(ctx.buyer));

        other.hydrate().await?;

        assert_eq!(other.len(), 1);
        assert!(other.contains(tee.uuid));

        Ok(())
    }
}
