//! Cart subcommands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use uuid::Uuid;

use liveshop::money;
use liveshop_store::cart::CartStore;
use liveshop_store::gateway::StorefrontGateway;
use liveshop_store::notify::Notifier;

use crate::cli::{ApiArgs, print_notices};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Print the cart as the server currently has it
    Show(ShowArgs),

    /// Add units of a product to the cart
    Add(AddArgs),

    /// Set the quantity on an existing cart line
    Update(UpdateArgs),

    /// Remove a cart line
    Remove(RemoveArgs),

    /// Empty the cart entirely
    Clear(ClearArgs),
}

#[derive(Debug, Args)]
struct ShowArgs {
    #[command(flatten)]
    api: ApiArgs,

    /// ISO currency code used to format amounts
    #[arg(long, env = "LIVESHOP_CURRENCY", default_value = "USD")]
    currency: String,
}

#[derive(Debug, Args)]
struct AddArgs {
    #[command(flatten)]
    api: ApiArgs,

    /// Product UUID to add
    #[arg(long)]
    product: Uuid,

    /// Units to add on top of what the cart already holds
    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    #[command(flatten)]
    api: ApiArgs,

    /// Cart line UUID to update
    #[arg(long)]
    line: Uuid,

    /// New absolute quantity; zero removes the line
    #[arg(long)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct RemoveArgs {
    #[command(flatten)]
    api: ApiArgs,

    /// Cart line UUID to remove
    #[arg(long)]
    line: Uuid,
}

#[derive(Debug, Args)]
struct ClearArgs {
    #[command(flatten)]
    api: ApiArgs,
}

pub(crate) async fn run(command: CartCommand) -> Result<(), String> {
    match command.command {
        CartSubcommand::Show(args) => show(args).await,
        CartSubcommand::Add(args) => add(args).await,
        CartSubcommand::Update(args) => update(args).await,
        CartSubcommand::Remove(args) => remove(args).await,
        CartSubcommand::Clear(args) => clear(args).await,
    }
}

async fn show(args: ShowArgs) -> Result<(), String> {
    let gateway = args.api.gateway()?;
    let (notifier, _notices) = Notifier::channel();
    let mut cart = CartStore::new(gateway, notifier);

    cart.hydrate()
        .await
        .map_err(|error| format!("failed to fetch the cart: {error}"))?;

    print_cart(&cart, &args.currency);

    Ok(())
}

async fn add(args: AddArgs) -> Result<(), String> {
    let gateway = args.api.gateway()?;
    let (notifier, mut notices) = Notifier::channel();
    let mut cart = CartStore::new(gateway.clone(), notifier);

    let product = gateway
        .product(args.product.into())
        .await
        .map_err(|error| format!("failed to fetch product {}: {error}", args.product))?;

    cart.hydrate()
        .await
        .map_err(|error| format!("failed to fetch the cart: {error}"))?;

    let result = cart.add_item(&product, args.quantity).await;

    print_notices(&mut notices);

    result.map_err(|error| format!("cart add failed: {error}"))
}

async fn update(args: UpdateArgs) -> Result<(), String> {
    let gateway = args.api.gateway()?;
    let (notifier, mut notices) = Notifier::channel();
    let mut cart = CartStore::new(gateway, notifier);

    cart.hydrate()
        .await
        .map_err(|error| format!("failed to fetch the cart: {error}"))?;

    let result = cart.update_quantity(args.line.into(), args.quantity).await;

    print_notices(&mut notices);

    result.map_err(|error| format!("cart update failed: {error}"))
}

async fn remove(args: RemoveArgs) -> Result<(), String> {
    let gateway = args.api.gateway()?;
    let (notifier, mut notices) = Notifier::channel();
    let mut cart = CartStore::new(gateway, notifier);

    cart.hydrate()
        .await
        .map_err(|error| format!("failed to fetch the cart: {error}"))?;

    let result = cart.remove_item(args.line.into()).await;

    print_notices(&mut notices);

    result.map_err(|error| format!("cart remove failed: {error}"))
}

async fn clear(args: ClearArgs) -> Result<(), String> {
    let gateway = args.api.gateway()?;
    let (notifier, mut notices) = Notifier::channel();
    let mut cart = CartStore::new(gateway, notifier);

    cart.hydrate()
        .await
        .map_err(|error| format!("failed to fetch the cart: {error}"))?;

    let result = cart.clear().await;

    print_notices(&mut notices);

    result.map_err(|error| format!("cart clear failed: {error}"))
}

#[expect(clippy::print_stdout, reason = "operator-facing command output")]
fn print_cart(cart: &CartStore, currency: &str) {
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }

    for line in cart.lines() {
        println!(
            "{} x{} @ {} = {} [{}]",
            line.title,
            line.quantity,
            money::format_minor(line.unit_price, currency),
            money::format_minor(line.line_total(), currency),
            line.uuid,
        );
    }

    println!("items: {}", cart.item_count());
    println!("subtotal: {}", money::format_minor(cart.subtotal(), currency));
}
