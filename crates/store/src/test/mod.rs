//! Shared test fixtures and doubles.

pub(crate) mod gateway;

pub(crate) use context::TestContext;
pub(crate) use gateway::InMemoryGateway;

use jiff::Timestamp;
use rust_decimal::Decimal;
use smallvec::SmallVec;

use liveshop::{shipping::DeliveryOption, totals::Totals};

use crate::{
    catalog::{AttributeMap, ProductSnapshot, ProductUuid},
    checkout::{Address, AddressForm},
    orders::{Order, OrderItem, OrderStatus, OrderUuid, PaymentMethod, PaymentStatus},
    session::BuyerUuid,
};

pub(crate) fn product_snapshot(title: &str, price: i64, inventory: u32) -> ProductSnapshot {
    ProductSnapshot {
        uuid: ProductUuid::new(),
        title: title.to_string(),
        price,
        inventory,
        images: SmallVec::new(),
        category: None,
        attributes: AttributeMap::new(),
    }
}

pub(crate) fn address() -> Address {
    Address {
        full_name: "Priya Sharma".to_string(),
        phone: "9876543210".to_string(),
        line1: "14 Lakeview Road".to_string(),
        line2: None,
        city: "Pune".to_string(),
        state: "Maharashtra".to_string(),
        postal_code: "411001".to_string(),
    }
}

pub(crate) fn address_form() -> AddressForm {
    AddressForm {
        full_name: "Priya Sharma".to_string(),
        phone: "9876543210".to_string(),
        line1: "14 Lakeview Road".to_string(),
        line2: String::new(),
        city: "Pune".to_string(),
        state: "Maharashtra".to_string(),
        postal_code: "411001".to_string(),
    }
}

pub(crate) fn order_fixture(status: OrderStatus) -> Order {
    Order {
        uuid: OrderUuid::new(),
        buyer: BuyerUuid::new(),
        items: vec![OrderItem {
            product_uuid: ProductUuid::new(),
            title: "Graphic Tee".to_string(),
            image: None,
            unit_price: 2999,
            quantity: 2,
        }],
        totals: Totals {
            subtotal: 5998,
            discount: Decimal::ZERO,
            shipping: 499,
            tax: Decimal::new(107_964, 2),
            total: 7577,
            item_count: 2,
        },
        status,
        payment_status: PaymentStatus::Paid,
        shipping_address: address(),
        delivery: DeliveryOption::Standard,
        notes: None,
        payment_method: PaymentMethod::Card,
        tracking: None,
        placed_at: Timestamp::now(),
    }
}
