//! Checkout
//!
//! The `Address -> Review -> Payment -> Success` flow, modeled as an owned
//! state machine rather than UI routing. Each step is only reachable from
//! the one before it, an empty cart cannot enter the flow at all, and a
//! failed payment restarts the flow from the address step with the order's
//! payment marked failed.

mod address;

pub use address::{Address, AddressError, AddressField, AddressForm};

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use liveshop::{
    promos::PromoCode,
    shipping::{DeliveryOption, ShippingPolicy},
    totals::{Totals, TotalsError},
};

use crate::{
    cart::CartStore,
    gateway::{GatewayError, StorefrontGateway},
    notify::Notifier,
    orders::{Order, OrderDraft, OrderItem, OrderUuid, PaymentMethod, PaymentStatus},
    session::BuyerUuid,
};

/// Where the buyer is in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    /// Capturing and validating the shipping address.
    Address,

    /// Read-only review of items, address, and totals.
    Review,

    /// Order created; awaiting the payment collaborator.
    Payment,

    /// Paid and done; terminal.
    Success {
        /// The order that was placed.
        order: OrderUuid,
    },

    /// Abandoned; terminal.
    Failed,
}

/// Errors that can occur while driving the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout never starts on an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// No signed-in buyer to place an order for.
    #[error("sign in to check out")]
    Unauthenticated,

    /// The operation does not belong to the current stage.
    #[error("checkout is not at the {0} step")]
    WrongStage(&'static str),

    /// The address form has failing fields; the flow stays at the address
    /// step.
    #[error("{} address field(s) need attention", .0.len())]
    Validation(Vec<AddressError>),

    /// The server refused or failed to create the order; the flow stays at
    /// review.
    #[error("order could not be created")]
    OrderCreation(#[source] GatewayError),

    /// The payment collaborator declined or failed; the flow restarted from
    /// the address step.
    #[error("payment failed")]
    Payment(#[source] PaymentError),

    /// The cart could not be priced for the draft.
    #[error(transparent)]
    Totals(#[from] TotalsError),
}

/// Errors from the payment collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The processor refused the payment.
    #[error("payment was declined: {0}")]
    Declined(String),

    /// The processor could not be reached or errored out.
    #[error("payment service unavailable: {0}")]
    Unavailable(String),
}

/// Receipt from a successful payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    /// Processor reference for support and reconciliation.
    pub reference: String,
}

/// The external payment collaborator.
#[automock]
#[async_trait]
pub trait PaymentPort: Send + Sync {
    /// Collects `amount` minor units for the order.
    async fn collect(
        &self,
        order: OrderUuid,
        amount: i64,
    ) -> Result<PaymentConfirmation, PaymentError>;
}

/// One buyer's trip through checkout.
///
/// Built per attempt and thrown away after; re-entering checkout means a
/// fresh flow. The pricing policy is fixed at [`begin`] so the totals the
/// buyer reviews are the totals the order is placed with.
///
/// [`begin`]: CheckoutFlow::begin
pub struct CheckoutFlow {
    gateway: Arc<dyn StorefrontGateway>,
    notifier: Notifier,
    policy: ShippingPolicy,
    tax_rate: Decimal,
    stage: CheckoutStage,
    form: AddressForm,
    address: Option<Address>,
    delivery: DeliveryOption,
    payment_method: PaymentMethod,
    notes: Option<String>,
    promo: Option<PromoCode>,
    order: Option<Order>,
}

impl CheckoutFlow {
    /// Starts checkout at the address step.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: The cart has nothing in it; the UI
    ///   should route back to the cart instead.
    pub fn begin(
        cart: &CartStore,
        policy: ShippingPolicy,
        tax_rate: Decimal,
        gateway: Arc<dyn StorefrontGateway>,
        notifier: Notifier,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(Self {
            gateway,
            notifier,
            policy,
            tax_rate,
            stage: CheckoutStage::Address,
            form: AddressForm::default(),
            address: None,
            delivery: DeliveryOption::Standard,
            payment_method: PaymentMethod::Card,
            notes: None,
            promo: None,
            order: None,
        })
    }

    /// The current stage.
    #[must_use]
    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// The address form as last edited.
    #[must_use]
    pub fn form(&self) -> &AddressForm {
        &self.form
    }

    /// Replaces the address form with the buyer's latest edits.
    pub fn set_form(&mut self, form: AddressForm) {
        self.form = form;
    }

    /// The chosen delivery option.
    #[must_use]
    pub fn delivery(&self) -> DeliveryOption {
        self.delivery
    }

    /// Chooses how the order ships.
    pub fn set_delivery(&mut self, delivery: DeliveryOption) {
        self.delivery = delivery;
    }

    /// Chooses how the buyer pays.
    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    /// Sets delivery notes for the seller.
    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    /// Applies an already-validated promo code to this checkout.
    ///
    /// Validity windows and redemption caps are buyer-dependent, so the
    /// caller checks them ([`PromoCode::check_usable`]) when the code is
    /// entered; the cart-dependent checks re-run on every pricing.
    pub fn set_promo(&mut self, promo: Option<PromoCode>) {
        self.promo = promo;
    }

    /// The order created by [`place_order`], once there is one.
    ///
    /// [`place_order`]: CheckoutFlow::place_order
    #[must_use]
    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Prices the cart as this checkout is configured, for the review
    /// screen.
    ///
    /// # Errors
    ///
    /// - [`TotalsError`]: The promo rejected the cart or an amount was out
    ///   of range.
    pub fn totals(&self, cart: &CartStore) -> Result<Totals, TotalsError> {
        cart.totals(self.promo.as_ref(), &self.policy, self.delivery, self.tax_rate)
    }

    /// Validates the form; on success the flow moves to review.
    ///
    /// Validation re-runs in full on every call, so fixing a field and
    /// resubmitting clears its error.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::WrongStage`]: The flow is not at the address step.
    /// - [`CheckoutError::Validation`]: One error per failing field; the
    ///   flow stays at the address step.
    pub fn submit_address(&mut self) -> Result<(), CheckoutError> {
        if !matches!(self.stage, CheckoutStage::Address) {
            return Err(CheckoutError::WrongStage("address"));
        }

        match self.form.validate() {
            Ok(address) => {
                self.address = Some(address);
                self.stage = CheckoutStage::Review;

                Ok(())
            }
            Err(errors) => Err(CheckoutError::Validation(errors)),
        }
    }

    /// Steps from review back to the address form, keeping everything the
    /// buyer entered.
    pub fn back_to_address(&mut self) {
        if matches!(self.stage, CheckoutStage::Review) {
            self.stage = CheckoutStage::Address;
        }
    }

    /// Creates the order from the reviewed cart and moves to payment.
    ///
    /// The order starts `Pending` with payment `Pending`. On failure the
    /// flow stays at review so the buyer can retry without re-entering
    /// anything.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::WrongStage`]: The flow is not at review.
    /// - [`CheckoutError::Totals`]: The cart could not be priced.
    /// - [`CheckoutError::OrderCreation`]: The server refused or failed.
    #[tracing::instrument(
        name = "checkout.place_order",
        skip(self, cart, buyer),
        fields(
            buyer_uuid = %buyer,
            order_uuid = tracing::field::Empty,
            amount = tracing::field::Empty
        ),
        err
    )]
    pub async fn place_order(
        &mut self,
        cart: &CartStore,
        buyer: BuyerUuid,
    ) -> Result<OrderUuid, CheckoutError> {
        if !matches!(self.stage, CheckoutStage::Review) {
            return Err(CheckoutError::WrongStage("review"));
        }

        let Some(address) = self.address.clone() else {
            return Err(CheckoutError::WrongStage("review"));
        };

        let totals = self.totals(cart)?;

        tracing::Span::current().record("amount", totals.total);

        let draft = OrderDraft {
            buyer,
            items: cart.lines().iter().map(OrderItem::from).collect(),
            totals,
            promo_code: self.promo.as_ref().map(|promo| promo.code.clone()),
            shipping_address: address,
            delivery: self.delivery,
            notes: self.notes.clone(),
            payment_method: self.payment_method,
        };

        let result = self.gateway.create_order(draft).await;

        match result {
            Ok(order) => {
                let uuid = order.uuid;

                tracing::Span::current().record("order_uuid", tracing::field::display(uuid));

                self.order = Some(order);
                self.stage = CheckoutStage::Payment;
                self.notifier.info("Order created, continue to payment");

                Ok(uuid)
            }
            Err(error) => {
                self.notifier
                    .error("We could not create your order, please try again");

                Err(CheckoutError::OrderCreation(error))
            }
        }
    }

    /// Collects payment for the created order.
    ///
    /// Success finishes the flow and empties the cart. Failure marks the
    /// order's payment failed and returns the flow to the address step with
    /// the entered address intact, ready for a retry.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::WrongStage`]: The flow is not at the payment step.
    /// - [`CheckoutError::Payment`]: The collaborator declined or failed.
    #[tracing::instrument(
        name = "checkout.submit_payment",
        skip(self, cart, payment),
        fields(
            order_uuid = tracing::field::Empty,
            amount = tracing::field::Empty
        ),
        err
    )]
    pub async fn submit_payment(
        &mut self,
        cart: &mut CartStore,
        payment: &dyn PaymentPort,
    ) -> Result<OrderUuid, CheckoutError> {
        if !matches!(self.stage, CheckoutStage::Payment) {
            return Err(CheckoutError::WrongStage("payment"));
        }

        let Some(order) = self.order.as_mut() else {
            return Err(CheckoutError::WrongStage("payment"));
        };

        let span = tracing::Span::current();

        span.record("order_uuid", tracing::field::display(order.uuid));
        span.record("amount", order.totals.total);

        let result = payment.collect(order.uuid, order.totals.total).await;

        match result {
            Ok(confirmation) => {
                debug!(reference = %confirmation.reference, "payment confirmed");

                order.payment_status = PaymentStatus::Paid;

                let uuid = order.uuid;

                self.stage = CheckoutStage::Success { order: uuid };

                // Post-order cleanup; a failed clear reports through the
                // cart's own notice and the next hydrate converges.
                _ = cart.clear().await;

                self.notifier.success("Order placed, thank you");

                Ok(uuid)
            }
            Err(error) => {
                order.payment_status = PaymentStatus::Failed;
                self.stage = CheckoutStage::Address;
                self.notifier.error(format!("Payment failed: {error}"));

                Err(CheckoutError::Payment(error))
            }
        }
    }

    /// Abandons the flow; terminal unless checkout already succeeded.
    pub fn cancel(&mut self) {
        if matches!(self.stage, CheckoutStage::Success { .. }) {
            return;
        }

        self.stage = CheckoutStage::Failed;
        self.notifier.info("Checkout cancelled");
    }
}

impl Debug for CheckoutFlow {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CheckoutFlow")
            .field("stage", &self.stage)
            .field("delivery", &self.delivery)
            .field("payment_method", &self.payment_method)
            .finish_non_exhaustive()
    }
}
