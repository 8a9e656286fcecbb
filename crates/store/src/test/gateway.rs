//! An in-memory storefront server.
//!
//! Behaves like the hosted API as the stores experience it: it validates
//! stock, keeps per-line price snapshots, answers not-found for missing
//! rows, and can be switched "offline" so every call fails with a network
//! error.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use jiff::Timestamp;
use rustc_hash::FxHashMap;

use liveshop::promos::PromoCode;

use crate::{
    cart::{CartLine, LineUuid},
    catalog::{ProductSnapshot, ProductUuid},
    gateway::{FetchedPromo, GatewayError, StorefrontGateway},
    orders::{Order, OrderAdminUpdate, OrderDraft, OrderStatus, OrderUuid, PaymentStatus},
    wishlist::WishlistEntry,
};

#[derive(Debug, Default)]
struct ServerState {
    offline: bool,
    products: FxHashMap<ProductUuid, ProductSnapshot>,
    cart: Vec<CartLine>,
    wishlist: Vec<WishlistEntry>,
    promos: FxHashMap<String, (PromoCode, u32)>,
    orders: FxHashMap<OrderUuid, Order>,
}

impl ServerState {
    fn ensure_online(&self) -> Result<(), GatewayError> {
        if self.offline {
            return Err(GatewayError::Network(
                "the storefront API is unreachable".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct InMemoryGateway {
    state: Mutex<ServerState>,
}

impl InMemoryGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn upsert_product(&self, product: ProductSnapshot) {
        self.lock().products.insert(product.uuid, product);
    }

    pub(crate) fn seed_promo(&self, promo: PromoCode, buyer_uses: u32) {
        self.lock()
            .promos
            .insert(promo.code.clone(), (promo, buyer_uses));
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub(crate) fn server_cart(&self) -> Vec<CartLine> {
        self.lock().cart.clone()
    }

    pub(crate) fn server_wishlist(&self) -> Vec<WishlistEntry> {
        self.lock().wishlist.clone()
    }

    pub(crate) fn order(&self, order: OrderUuid) -> Option<Order> {
        self.lock().orders.get(&order).cloned()
    }
}

#[async_trait]
impl StorefrontGateway for InMemoryGateway {
    async fn cart_snapshot(&self) -> Result<Vec<CartLine>, GatewayError> {
        let state = self.lock();

        state.ensure_online()?;

        // Availability is live; unit prices stay as captured per row.
        let mut rows = state.cart.clone();

        for row in &mut rows {
            if let Some(product) = state.products.get(&row.product_uuid) {
                row.available = product.inventory;
                row.in_stock = product.in_stock();
            }
        }

        Ok(rows)
    }

    async fn add_cart_line(
        &self,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartLine, GatewayError> {
        let mut state = self.lock();

        state.ensure_online()?;

        let snapshot = state
            .products
            .get(&product)
            .ok_or(GatewayError::NotFound)?
            .clone();

        if quantity > snapshot.inventory {
            return Err(GatewayError::Rejected(format!(
                "only {} of {} available",
                snapshot.inventory, snapshot.title
            )));
        }

        if let Some(row) = state
            .cart
            .iter_mut()
            .find(|row| row.product_uuid == product)
        {
            row.quantity = quantity;
            row.available = snapshot.inventory;
            row.in_stock = snapshot.in_stock();

            return Ok(row.clone());
        }

        let row = CartLine::from_snapshot(&snapshot, quantity);

        state.cart.push(row.clone());

        Ok(row)
    }

    async fn update_cart_line(
        &self,
        line: LineUuid,
        quantity: u32,
    ) -> Result<CartLine, GatewayError> {
        let mut state = self.lock();

        state.ensure_online()?;

        let product = state
            .cart
            .iter()
            .find(|row| row.uuid == line)
            .map(|row| row.product_uuid)
            .ok_or(GatewayError::NotFound)?;

        let available = state.products.get(&product).map(|p| p.inventory);

        if let Some(cap) = available
            && quantity > cap
        {
            return Err(GatewayError::Rejected(format!("only {cap} available")));
        }

        let Some(row) = state.cart.iter_mut().find(|row| row.uuid == line) else {
            return Err(GatewayError::NotFound);
        };

        row.quantity = quantity;

        if let Some(cap) = available {
            row.available = cap;
            row.in_stock = cap > 0;
        }

        Ok(row.clone())
    }

    async fn remove_cart_line(&self, line: LineUuid) -> Result<(), GatewayError> {
        let mut state = self.lock();

        state.ensure_online()?;

        let Some(index) = state.cart.iter().position(|row| row.uuid == line) else {
            return Err(GatewayError::NotFound);
        };

        state.cart.remove(index);

        Ok(())
    }

    async fn clear_cart(&self) -> Result<(), GatewayError> {
        let mut state = self.lock();

        state.ensure_online()?;
        state.cart.clear();

        Ok(())
    }

    async fn wishlist(&self) -> Result<Vec<WishlistEntry>, GatewayError> {
        let state = self.lock();

        state.ensure_online()?;

        Ok(state.wishlist.clone())
    }

    async fn add_wishlist(&self, product: ProductUuid) -> Result<WishlistEntry, GatewayError> {
        let mut state = self.lock();

        state.ensure_online()?;

        if let Some(entry) = state
            .wishlist
            .iter()
            .find(|entry| entry.product_uuid == product)
        {
            return Ok(entry.clone());
        }

        let entry = WishlistEntry {
            product_uuid: product,
            added_at: Timestamp::now(),
        };

        state.wishlist.push(entry.clone());

        Ok(entry)
    }

    async fn remove_wishlist(&self, product: ProductUuid) -> Result<(), GatewayError> {
        let mut state = self.lock();

        state.ensure_online()?;

        let Some(index) = state
            .wishlist
            .iter()
            .position(|entry| entry.product_uuid == product)
        else {
            return Err(GatewayError::NotFound);
        };

        state.wishlist.remove(index);

        Ok(())
    }

    async fn product(&self, product: ProductUuid) -> Result<ProductSnapshot, GatewayError> {
        let state = self.lock();

        state.ensure_online()?;

        state
            .products
            .get(&product)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn promo(&self, code: String) -> Result<FetchedPromo, GatewayError> {
        let state = self.lock();

        state.ensure_online()?;

        state
            .promos
            .get(&code.trim().to_uppercase())
            .map(|(promo, buyer_uses)| FetchedPromo {
                promo: promo.clone(),
                buyer_uses: *buyer_uses,
            })
            .ok_or(GatewayError::NotFound)
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order, GatewayError> {
        let mut state = self.lock();

        state.ensure_online()?;

        let order = Order {
            uuid: OrderUuid::new(),
            buyer: draft.buyer,
            items: draft.items,
            totals: draft.totals,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            shipping_address: draft.shipping_address,
            delivery: draft.delivery,
            notes: draft.notes,
            payment_method: draft.payment_method,
            tracking: None,
            placed_at: Timestamp::now(),
        };

        state.orders.insert(order.uuid, order.clone());

        Ok(order)
    }

    async fn update_order(
        &self,
        order: OrderUuid,
        update: OrderAdminUpdate,
    ) -> Result<Order, GatewayError> {
        let mut state = self.lock();

        state.ensure_online()?;

        let Some(stored) = state.orders.get_mut(&order) else {
            return Err(GatewayError::NotFound);
        };

        stored
            .apply_admin_update(update)
            .map_err(|error| GatewayError::Rejected(error.to_string()))?;

        Ok(stored.clone())
    }
}
