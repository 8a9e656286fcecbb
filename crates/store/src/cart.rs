//! Cart

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use liveshop::{
    lines::LineItem,
    promos::PromoCode,
    shipping::{DeliveryOption, ShippingPolicy},
    totals::{self, Totals, TotalsError},
};

use crate::{
    catalog::{ProductSnapshot, ProductUuid},
    errors::CartError,
    gateway::{GatewayError, StorefrontGateway},
    notify::Notifier,
    uuids::TypedUuid,
};

/// Cart line identifier.
pub type LineUuid = TypedUuid<CartLine>;

/// One cart row: a product at a quantity, with the product data copied at
/// the moment the row was created.
///
/// The unit price is a snapshot; later catalog edits do not move it. A full
/// [`CartStore::hydrate`] is the only thing that refreshes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Line identity. Provisional until the server confirms the line.
    pub uuid: LineUuid,

    /// The product this row holds.
    pub product_uuid: ProductUuid,

    /// Product title at add time.
    pub title: String,

    /// Product thumbnail at add time.
    pub image: Option<String>,

    /// Product category at add time.
    pub category: Option<String>,

    /// Unit price in minor units, frozen at add time.
    pub unit_price: i64,

    /// Units of the product on this row.
    pub quantity: u32,

    /// Stock available per the last server sync; bounds quantity updates.
    pub available: u32,

    /// Whether the product was purchasable at the last sync.
    pub in_stock: bool,
}

impl CartLine {
    /// Builds the provisional row for an optimistic add.
    #[must_use]
    pub fn from_snapshot(product: &ProductSnapshot, quantity: u32) -> Self {
        Self {
            uuid: LineUuid::new(),
            product_uuid: product.uuid,
            title: product.title.clone(),
            image: product.thumbnail().map(str::to_string),
            category: product.category.clone(),
            unit_price: product.price,
            quantity,
            available: product.inventory,
            in_stock: product.in_stock(),
        }
    }

    /// Price of the whole row in minor units, saturating on overflow.
    #[must_use]
    pub fn line_total(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }

    fn as_line_item(&self) -> LineItem {
        LineItem {
            unit_price: self.unit_price,
            quantity: self.quantity,
            category: self.category.clone(),
        }
    }
}

/// Captured pre-mutation state of one product's row, for rollback.
struct LineRevert {
    product: ProductUuid,
    index: usize,
    line: Option<CartLine>,
}

/// The cart state container.
///
/// One per session, owned by it; there are no process-wide carts. Every
/// mutation is optimistic: the local change lands first, the gateway
/// confirms it, and a failed confirmation restores the captured
/// pre-mutation state. When confirmations resolve out of order, a
/// per-product operation sequence makes the newest local operation win;
/// stale confirmations are dropped.
pub struct CartStore {
    gateway: Arc<dyn StorefrontGateway>,
    notifier: Notifier,
    lines: Vec<CartLine>,
    op_seq: u64,
    line_ops: FxHashMap<ProductUuid, u64>,
}

impl CartStore {
    /// Creates an empty cart backed by `gateway`.
    #[must_use]
    pub fn new(gateway: Arc<dyn StorefrontGateway>, notifier: Notifier) -> Self {
        Self {
            gateway,
            notifier,
            lines: Vec::new(),
            op_seq: 0,
            line_ops: FxHashMap::default(),
        }
    }

    /// Current rows, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all rows.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of row totals in minor units, saturating on overflow.
    ///
    /// Display-grade; [`totals`](Self::totals) is the checked, authoritative
    /// computation.
    #[must_use]
    pub fn subtotal(&self) -> i64 {
        self.lines
            .iter()
            .fold(0_i64, |acc, line| acc.saturating_add(line.line_total()))
    }

    /// The row with the given line id, when present.
    #[must_use]
    pub fn find_line(&self, line: LineUuid) -> Option<&CartLine> {
        self.lines.iter().find(|candidate| candidate.uuid == line)
    }

    /// The row holding the given product, when present.
    #[must_use]
    pub fn line_for_product(&self, product: ProductUuid) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|candidate| candidate.product_uuid == product)
    }

    /// Prices the cart.
    ///
    /// Derived on demand from the current rows, never cached, so it cannot
    /// go stale. Buyer- and clock-dependent promo checks
    /// ([`PromoCode::check_usable`]) are the caller's job.
    ///
    /// # Errors
    ///
    /// - [`TotalsError`]: The promo rejected this cart, the tax rate is out
    ///   of range, or an amount overflowed.
    pub fn totals(
        &self,
        promo: Option<&PromoCode>,
        policy: &ShippingPolicy,
        delivery: DeliveryOption,
        tax_rate: Decimal,
    ) -> Result<Totals, TotalsError> {
        let items: Vec<LineItem> = self.lines.iter().map(CartLine::as_line_item).collect();

        totals::compute_totals(&items, promo, policy, delivery, tax_rate)
    }

    /// Adds `quantity` units of `product`, merging into the product's
    /// existing row if there is one.
    ///
    /// The resulting quantity is validated against the product's available
    /// stock before anything changes; a cart can never hold more of a
    /// product than the catalog says exists. Exactly one notice reports the
    /// outcome.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero; no request was
    ///   made.
    /// - [`CartError::InsufficientInventory`]: Stock is too low; no request
    ///   was made.
    /// - [`CartError::Sync`]: The gateway failed; the cart was rolled back.
    pub async fn add_item(
        &mut self,
        product: &ProductSnapshot,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            self.notifier.error("Quantity must be at least 1");

            return Err(CartError::InvalidQuantity);
        }

        let current = self
            .line_for_product(product.uuid)
            .map_or(0, |line| line.quantity);

        let requested = current.saturating_add(quantity);

        if requested > product.inventory {
            self.notifier.error(format!(
                "Only {} of {} available",
                product.inventory, product.title
            ));

            return Err(CartError::InsufficientInventory {
                available: product.inventory,
            });
        }

        let seq = self.begin_op(product.uuid);
        let revert = self.capture(product.uuid);

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_uuid == product.uuid)
        {
            line.quantity = requested;
        } else {
            self.lines.push(CartLine::from_snapshot(product, quantity));
        }

        let result = self.gateway.add_cart_line(product.uuid, requested).await;

        match result {
            Ok(confirmed) => {
                self.reconcile(product.uuid, seq, confirmed);
                self.notifier
                    .success(format!("Added {} to your cart", product.title));

                Ok(())
            }
            Err(error) => {
                self.restore(revert);
                self.notifier
                    .error(format!("Could not add {}: {error}", product.title));

                Err(CartError::Sync(error))
            }
        }
    }

    /// Sets a row to `quantity` units; zero removes the row.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`]: No such row, locally or on the server.
    /// - [`CartError::InsufficientInventory`]: `quantity` exceeds the stock
    ///   available at the last sync; the row is unchanged.
    /// - [`CartError::Sync`]: The gateway failed; the row was rolled back.
    pub async fn update_quantity(
        &mut self,
        line: LineUuid,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_item(line).await;
        }

        let Some(target) = self.find_line(line) else {
            self.notifier.error("That item is no longer in your cart");

            return Err(CartError::LineNotFound);
        };

        if quantity > target.available {
            let available = target.available;

            self.notifier
                .error(format!("Only {available} of {} available", target.title));

            return Err(CartError::InsufficientInventory { available });
        }

        let product = target.product_uuid;

        let seq = self.begin_op(product);
        let revert = self.capture(product);

        if let Some(target) = self.lines.iter_mut().find(|row| row.uuid == line) {
            target.quantity = quantity;
        }

        let result = self.gateway.update_cart_line(line, quantity).await;

        match result {
            Ok(confirmed) => {
                self.reconcile(product, seq, confirmed);
                self.notifier.success("Cart updated");

                Ok(())
            }
            Err(GatewayError::NotFound) => {
                // The row vanished server-side; an update has nothing left
                // to target.
                self.restore(revert);
                self.notifier.error("That item is no longer in your cart");

                Err(CartError::LineNotFound)
            }
            Err(error) => {
                self.restore(revert);
                self.notifier
                    .error(format!("Could not update your cart: {error}"));

                Err(CartError::Sync(error))
            }
        }
    }

    /// Removes a row.
    ///
    /// Removing a row that is not in the cart is a silent no-op, and the
    /// server reporting the row already gone counts as success; removal
    /// converges on "not in the cart" from any starting point.
    ///
    /// # Errors
    ///
    /// - [`CartError::Sync`]: The gateway failed; the row was restored to
    ///   its original position.
    pub async fn remove_item(&mut self, line: LineUuid) -> Result<(), CartError> {
        let Some(index) = self.lines.iter().position(|row| row.uuid == line) else {
            return Ok(());
        };

        let removed = self.lines.remove(index);
        let product = removed.product_uuid;

        self.begin_op(product);

        let revert = LineRevert {
            product,
            index,
            line: Some(removed.clone()),
        };

        let result = self.gateway.remove_cart_line(line).await;

        match result {
            Ok(()) | Err(GatewayError::NotFound) => {
                self.notifier
                    .success(format!("Removed {} from your cart", removed.title));

                Ok(())
            }
            Err(error) => {
                self.restore(revert);
                self.notifier
                    .error(format!("Could not remove {}: {error}", removed.title));

                Err(CartError::Sync(error))
            }
        }
    }

    /// Empties the cart. Serves both the explicit user action and the
    /// cleanup after a successful order.
    ///
    /// # Errors
    ///
    /// - [`CartError::Sync`]: The gateway failed; every row was restored.
    pub async fn clear(&mut self) -> Result<(), CartError> {
        if self.lines.is_empty() {
            return Ok(());
        }

        let previous = std::mem::take(&mut self.lines);

        for line in &previous {
            self.begin_op(line.product_uuid);
        }

        let result = self.gateway.clear_cart().await;

        match result {
            Ok(()) => {
                self.line_ops.clear();
                self.notifier.success("Cart cleared");

                Ok(())
            }
            Err(error) => {
                self.lines = previous;
                self.notifier
                    .error(format!("Could not clear your cart: {error}"));

                Err(CartError::Sync(error))
            }
        }
    }

    /// Replaces local state with the server's cart.
    ///
    /// Availability comes back as the server sees it now; unit prices stay
    /// as they were captured when each line was added.
    ///
    /// # Errors
    ///
    /// - [`GatewayError`]: The cart could not be fetched; local state is
    ///   untouched.
    pub async fn hydrate(&mut self) -> Result<(), GatewayError> {
        let lines = self.gateway.cart_snapshot().await?;

        self.lines = lines;
        self.line_ops.clear();

        Ok(())
    }

    /// Stamps a new operation on the product's row and returns its sequence
    /// number.
    fn begin_op(&mut self, product: ProductUuid) -> u64 {
        self.op_seq += 1;
        self.line_ops.insert(product, self.op_seq);

        self.op_seq
    }

    fn capture(&self, product: ProductUuid) -> LineRevert {
        match self
            .lines
            .iter()
            .position(|line| line.product_uuid == product)
        {
            Some(index) => LineRevert {
                product,
                index,
                line: self.lines.get(index).cloned(),
            },
            None => LineRevert {
                product,
                index: self.lines.len(),
                line: None,
            },
        }
    }

    /// Puts a captured row back exactly where it was.
    fn restore(&mut self, revert: LineRevert) {
        let LineRevert {
            product,
            index,
            line,
        } = revert;

        if let Some(position) = self
            .lines
            .iter()
            .position(|candidate| candidate.product_uuid == product)
        {
            self.lines.remove(position);
        }

        if let Some(original) = line {
            let at = index.min(self.lines.len());

            self.lines.insert(at, original);
        }
    }

    /// Adopts the server's confirmed row unless a newer local operation on
    /// the same product has superseded this one.
    fn reconcile(&mut self, product: ProductUuid, seq: u64, confirmed: CartLine) {
        if self
            .line_ops
            .get(&product)
            .is_some_and(|latest| *latest > seq)
        {
            debug!(%product, seq, "dropping stale cart confirmation");

            return;
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_uuid == product)
        {
            *line = confirmed;
        }
    }
}

impl Debug for CartStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartStore")
            .field("lines", &self.lines)
            .field("op_seq", &self.op_seq)
            .finish_non_exhaustive()
    }
}
