//! Orders

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use liveshop::{shipping::DeliveryOption, totals::Totals};

use crate::{
    cart::CartLine,
    catalog::ProductUuid,
    checkout::Address,
    session::BuyerUuid,
    uuids::TypedUuid,
};

/// Order identifier.
pub type OrderUuid = TypedUuid<Order>;

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    /// Created, payment not yet confirmed.
    Pending,

    /// Paid and accepted by the seller.
    Confirmed,

    /// Handed to the carrier.
    Shipped,

    /// Received by the buyer; terminal.
    Delivered,

    /// Called off; terminal.
    Cancelled,
}

impl OrderStatus {
    /// Whether the order can never change status again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the fulfilment lifecycle allows moving to `next`.
    ///
    /// Forward moves go one step at a time; cancellation is allowed from any
    /// non-terminal state.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (
                    Self::Pending | Self::Confirmed | Self::Shipped,
                    Self::Cancelled
                )
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };

        f.write_str(name)
    }
}

/// Payment state, tracked separately from fulfilment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatus {
    /// Not yet attempted or still processing.
    Pending,

    /// Collected in full.
    Paid,

    /// The last attempt was declined or errored.
    Failed,

    /// Returned to the buyer.
    Refunded,
}

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    /// Card at checkout.
    Card,

    /// UPI transfer at checkout.
    Upi,

    /// Settled with the carrier on delivery.
    CashOnDelivery,
}

/// A row as frozen into an order.
///
/// Orders carry their own copy of the product data they were bought with,
/// so an order renders the same forever even if the catalog is edited or
/// the product retired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// The product as it existed in the catalog.
    pub product_uuid: ProductUuid,

    /// Title at purchase time.
    pub title: String,

    /// Thumbnail at purchase time.
    pub image: Option<String>,

    /// Unit price paid, in minor units.
    pub unit_price: i64,

    /// Units bought.
    pub quantity: u32,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_uuid: line.product_uuid,
            title: line.title.clone(),
            image: line.image.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
        }
    }
}

/// What the client submits to create an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    /// Who is buying.
    pub buyer: BuyerUuid,

    /// The reviewed cart, frozen.
    pub items: Vec<OrderItem>,

    /// The priced cart the buyer reviewed.
    pub totals: Totals,

    /// Promo code applied to the totals, when one was.
    pub promo_code: Option<String>,

    /// Where to ship.
    pub shipping_address: Address,

    /// How to ship.
    pub delivery: DeliveryOption,

    /// Buyer's delivery notes.
    pub notes: Option<String>,

    /// How the buyer pays.
    pub payment_method: PaymentMethod,
}

/// A placed order, as the server reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Server-assigned identity.
    pub uuid: OrderUuid,

    /// Who bought.
    pub buyer: BuyerUuid,

    /// The rows as bought.
    pub items: Vec<OrderItem>,

    /// The charge as priced at purchase time.
    pub totals: Totals,

    /// Fulfilment state.
    pub status: OrderStatus,

    /// Payment state.
    pub payment_status: PaymentStatus,

    /// Where it ships.
    pub shipping_address: Address,

    /// How it ships.
    pub delivery: DeliveryOption,

    /// Buyer's delivery notes.
    pub notes: Option<String>,

    /// How the buyer pays.
    pub payment_method: PaymentMethod,

    /// Carrier tracking reference, once shipped.
    pub tracking: Option<String>,

    /// When the order was created.
    pub placed_at: Timestamp,
}

/// An administrative status, tracking, or notes update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAdminUpdate {
    /// New fulfilment status, when changing it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,

    /// New tracking reference, when setting it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<String>,

    /// New notes, when setting them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Errors that can occur while applying an administrative update.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderUpdateError {
    /// The order is delivered or cancelled; its status is frozen.
    #[error("order is already {0}")]
    Terminal(OrderStatus),

    /// The lifecycle does not allow this move.
    #[error("order cannot move from {from} to {to}")]
    InvalidTransition {
        /// Where the order is.
        from: OrderStatus,
        /// Where the update wanted it.
        to: OrderStatus,
    },
}

impl Order {
    /// Applies an administrative update, honoring the lifecycle.
    ///
    /// Terminal orders still accept tracking and notes updates; only their
    /// status is frozen. Everything the buyer agreed to at purchase time
    /// (items, totals, address) is immutable here by construction.
    ///
    /// # Errors
    ///
    /// - [`OrderUpdateError::Terminal`]: A status change was requested on a
    ///   terminal order.
    /// - [`OrderUpdateError::InvalidTransition`]: The requested move is not
    ///   in the lifecycle.
    pub fn apply_admin_update(&mut self, update: OrderAdminUpdate) -> Result<(), OrderUpdateError> {
        if let Some(next) = update.status {
            if self.status.is_terminal() {
                return Err(OrderUpdateError::Terminal(self.status));
            }

            if !self.status.can_transition_to(next) {
                return Err(OrderUpdateError::InvalidTransition {
                    from: self.status,
                    to: next,
                });
            }

            self.status = next;
        }

        if let Some(tracking) = update.tracking {
            self.tracking = Some(tracking);
        }

        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }

        Ok(())
    }
}
