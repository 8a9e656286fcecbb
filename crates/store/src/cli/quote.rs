//! Prices the server-side cart without placing an order.

use std::sync::Arc;

use clap::Args;
use jiff::Timestamp;
use rust_decimal::Decimal;

use liveshop::money;
use liveshop::promos::PromoCode;
use liveshop::shipping::{DeliveryOption, ShippingPolicy};
use liveshop::totals::Totals;
use liveshop_store::cart::CartStore;
use liveshop_store::gateway::{HttpGateway, StorefrontGateway};
use liveshop_store::notify::Notifier;

use crate::cli::ApiArgs;

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    #[command(flatten)]
    api: ApiArgs,

    /// Promo code to price the cart with
    #[arg(long)]
    promo: Option<String>,

    /// Quote express delivery instead of standard
    #[arg(long)]
    express: bool,

    #[command(flatten)]
    pricing: PricingArgs,
}

/// Pricing knobs the hosted storefront would normally pin per tenant.
#[derive(Debug, Args)]
struct PricingArgs {
    /// Subtotal (minor units) at which standard shipping becomes free
    #[arg(
        long,
        env = "LIVESHOP_FREE_SHIPPING_THRESHOLD",
        default_value_t = 10_000
    )]
    free_threshold: i64,

    /// Standard shipping fee in minor units
    #[arg(long, env = "LIVESHOP_SHIPPING_FEE", default_value_t = 499)]
    flat_fee: i64,

    /// Express shipping fee in minor units
    #[arg(long, env = "LIVESHOP_EXPRESS_FEE", default_value_t = 1299)]
    express_fee: i64,

    /// Tax rate applied after discounts, as a fraction
    #[arg(long, env = "LIVESHOP_TAX_RATE", default_value = "0.18")]
    tax_rate: Decimal,

    /// ISO currency code used to format amounts
    #[arg(long, env = "LIVESHOP_CURRENCY", default_value = "USD")]
    currency: String,
}

impl PricingArgs {
    fn policy(&self) -> ShippingPolicy {
        ShippingPolicy {
            free_threshold: self.free_threshold,
            flat_fee: self.flat_fee,
            express_fee: self.express_fee,
        }
    }
}

pub(crate) async fn run(args: QuoteArgs) -> Result<(), String> {
    let gateway = args.api.gateway()?;
    let (notifier, _notices) = Notifier::channel();
    let mut cart = CartStore::new(Arc::clone(&gateway), notifier);

    cart.hydrate()
        .await
        .map_err(|error| format!("failed to fetch the cart: {error}"))?;

    let promo = match &args.promo {
        Some(code) => Some(fetch_promo(gateway.as_ref(), code).await?),
        None => None,
    };

    let delivery = if args.express {
        DeliveryOption::Express
    } else {
        DeliveryOption::Standard
    };

    let totals = cart
        .totals(
            promo.as_ref(),
            &args.pricing.policy(),
            delivery,
            args.pricing.tax_rate,
        )
        .map_err(|error| format!("could not price the cart: {error}"))?;

    print_quote(&totals, &args.pricing.currency)
}

async fn fetch_promo(gateway: &HttpGateway, code: &str) -> Result<PromoCode, String> {
    let fetched = gateway
        .promo(code.to_string())
        .await
        .map_err(|error| format!("failed to look up promo {code}: {error}"))?;

    fetched
        .promo
        .check_usable(Timestamp::now(), fetched.buyer_uses)
        .map_err(|rejection| format!("promo {code} cannot be used: {rejection}"))?;

    Ok(fetched.promo)
}

// Discount and tax stay exact decimals inside `Totals`; rounding here is
// display only.
#[expect(clippy::print_stdout, reason = "operator-facing command output")]
fn print_quote(totals: &Totals, currency: &str) -> Result<(), String> {
    let discount = money::round_to_minor(totals.discount)
        .map_err(|error| format!("could not format the discount: {error}"))?;
    let tax = money::round_to_minor(totals.tax)
        .map_err(|error| format!("could not format the tax: {error}"))?;

    println!("items:    {}", totals.item_count);
    println!("subtotal: {}", money::format_minor(totals.subtotal, currency));
    println!("discount: -{}", money::format_minor(discount, currency));
    println!("shipping: {}", money::format_minor(totals.shipping, currency));
    println!("tax:      {}", money::format_minor(tax, currency));
    println!("total:    {}", money::format_minor(totals.total, currency));

    Ok(())
}
