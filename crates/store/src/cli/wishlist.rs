//! Wishlist subcommands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use liveshop_store::cart::CartStore;
use liveshop_store::gateway::StorefrontGateway;
use liveshop_store::notify::{Notice, Notifier};
use liveshop_store::session::BuyerUuid;
use liveshop_store::wishlist::WishlistStore;

use crate::cli::{ApiArgs, print_notices};

#[derive(Debug, Args)]
pub(crate) struct WishlistCommand {
    #[command(subcommand)]
    command: WishlistSubcommand,
}

#[derive(Debug, Subcommand)]
enum WishlistSubcommand {
    /// Print the buyer's saved products
    Show(ShowArgs),

    /// Save a product for later
    Add(ProductArgs),

    /// Drop a product from the wishlist
    Remove(ProductArgs),

    /// Save the product, or drop it if it is already saved
    Toggle(ProductArgs),

    /// Move a saved product into the cart
    Move(ProductArgs),
}

#[derive(Debug, Args)]
struct BuyerArgs {
    /// Buyer UUID the wishlist belongs to
    #[arg(long, env = "LIVESHOP_BUYER_UUID")]
    buyer: Option<Uuid>,
}

impl BuyerArgs {
    fn uuid(&self) -> Option<BuyerUuid> {
        self.buyer.map(BuyerUuid::from)
    }
}

#[derive(Debug, Args)]
struct ShowArgs {
    #[command(flatten)]
    api: ApiArgs,

    #[command(flatten)]
    buyer: BuyerArgs,
}

#[derive(Debug, Args)]
struct ProductArgs {
    #[command(flatten)]
    api: ApiArgs,

    #[command(flatten)]
    buyer: BuyerArgs,

    /// Product UUID to operate on
    #[arg(long)]
    product: Uuid,
}

pub(crate) async fn run(command: WishlistCommand) -> Result<(), String> {
    match command.command {
        WishlistSubcommand::Show(args) => show(args).await,
        WishlistSubcommand::Add(args) => add(args).await,
        WishlistSubcommand::Remove(args) => remove(args).await,
        WishlistSubcommand::Toggle(args) => toggle(args).await,
        WishlistSubcommand::Move(args) => move_to_cart(args).await,
    }
}

async fn show(args: ShowArgs) -> Result<(), String> {
    let gateway = args.api.gateway()?;
    let (notifier, _notices) = Notifier::channel();
    let mut wishlist = WishlistStore::new(Arc::clone(&gateway), notifier, args.buyer.uuid());

    wishlist
        .hydrate()
        .await
        .map_err(|error| format!("failed to fetch the wishlist: {error}"))?;

    print_wishlist(&wishlist, gateway.as_ref()).await;

    Ok(())
}

async fn add(args: ProductArgs) -> Result<(), String> {
    let product = args.product;
    let (mut wishlist, mut notices) = store_for(args)?;

    hydrate(&mut wishlist).await?;

    let result = wishlist.add(product.into()).await;

    print_notices(&mut notices);

    result
        .map(|_| ())
        .map_err(|error| format!("wishlist add failed: {error}"))
}

async fn remove(args: ProductArgs) -> Result<(), String> {
    let product = args.product;
    let (mut wishlist, mut notices) = store_for(args)?;

    hydrate(&mut wishlist).await?;

    let result = wishlist.remove(product.into()).await;

    print_notices(&mut notices);

    result
        .map(|_| ())
        .map_err(|error| format!("wishlist remove failed: {error}"))
}

async fn toggle(args: ProductArgs) -> Result<(), String> {
    let product = args.product;
    let (mut wishlist, mut notices) = store_for(args)?;

    hydrate(&mut wishlist).await?;

    let result = wishlist.toggle(product.into()).await;

    print_notices(&mut notices);

    result
        .map(|_| ())
        .map_err(|error| format!("wishlist toggle failed: {error}"))
}

async fn move_to_cart(args: ProductArgs) -> Result<(), String> {
    let gateway = args.api.gateway()?;
    let (notifier, mut notices) = Notifier::channel();
    let mut wishlist = WishlistStore::new(
        Arc::clone(&gateway),
        notifier.clone(),
        args.buyer.uuid(),
    );
    let mut cart = CartStore::new(Arc::clone(&gateway), notifier);

    let product = gateway
        .product(args.product.into())
        .await
        .map_err(|error| format!("failed to fetch product {}: {error}", args.product))?;

    hydrate(&mut wishlist).await?;
    cart.hydrate()
        .await
        .map_err(|error| format!("failed to fetch the cart: {error}"))?;

    let result = wishlist.move_to_cart(&product, &mut cart).await;

    print_notices(&mut notices);

    result.map_err(|error| format!("wishlist move failed: {error}"))
}

fn store_for(args: ProductArgs) -> Result<(WishlistStore, UnboundedReceiver<Notice>), String> {
    let gateway = args.api.gateway()?;
    let (notifier, notices) = Notifier::channel();

    Ok((
        WishlistStore::new(gateway, notifier, args.buyer.uuid()),
        notices,
    ))
}

async fn hydrate(wishlist: &mut WishlistStore) -> Result<(), String> {
    wishlist
        .hydrate()
        .await
        .map_err(|error| format!("failed to fetch the wishlist: {error}"))
}

#[expect(clippy::print_stdout, reason = "operator-facing command output")]
async fn print_wishlist(wishlist: &WishlistStore, gateway: &dyn StorefrontGateway) {
    if wishlist.is_empty() {
        println!("wishlist is empty");
        return;
    }

    for entry in wishlist.entries() {
        match gateway.product(entry.product_uuid).await {
            Ok(product) => println!(
                "{} [{}] saved {}",
                product.title, entry.product_uuid, entry.added_at
            ),
            Err(_) => println!(
                "unknown product [{}] saved {}",
                entry.product_uuid, entry.added_at
            ),
        }
    }

    println!("saved: {}", wishlist.len());
}
