//! Command line interface for the storefront tool.

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc::UnboundedReceiver;

use liveshop_store::gateway::{HttpGateway, HttpGatewayConfig};
use liveshop_store::notify::{Notice, NoticeKind};

mod cart;
mod quote;
mod wishlist;

/// Storefront session tool for the LiveShop API.
#[derive(Debug, Parser)]
#[command(name = "liveshop-store", version, about)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Inspect and mutate the server-side cart
    Cart(cart::CartCommand),

    /// Inspect and mutate the buyer's wishlist
    Wishlist(wishlist::WishlistCommand),

    /// Price the current cart without placing an order
    Quote(quote::QuoteArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Cart(command) => cart::run(command).await,
            Commands::Wishlist(command) => wishlist::run(command).await,
            Commands::Quote(args) => quote::run(args).await,
        }
    }
}

/// Connection settings shared by every subcommand.
#[derive(Debug, Args)]
pub(crate) struct ApiArgs {
    /// Base URL of the storefront API
    #[arg(long, env = "LIVESHOP_API_URL")]
    api_url: String,

    /// Bearer token for authenticated sessions
    #[arg(long, env = "LIVESHOP_API_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

impl ApiArgs {
    pub(crate) fn gateway(self) -> Result<Arc<HttpGateway>, String> {
        let config = HttpGatewayConfig {
            base_url: self.api_url,
            token: self.token,
        };

        let gateway = HttpGateway::new(config)
            .map_err(|error| format!("failed to set up the API client: {error}"))?;

        Ok(Arc::new(gateway))
    }
}

/// Prints every notice the stores produced during the command.
#[expect(clippy::print_stdout, reason = "operator-facing command output")]
pub(crate) fn print_notices(notices: &mut UnboundedReceiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        let label = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Info => "info",
            NoticeKind::Warning => "warn",
            NoticeKind::Error => "error",
        };

        println!("[{label}] {}", notice.message);
    }
}
