//! LiveShop storefront CLI
//!
//! Drives a storefront session (cart, wishlist, quote) against a hosted
//! storefront API, mostly for poking at environments and reproducing
//! support issues without a browser.

use std::process;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;

#[tokio::main]
#[expect(
    clippy::print_stderr,
    reason = "startup failures report before any logging exists"
)]
async fn main() {
    let _env = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = cli::Cli::parse();

    if let Err(error) = cli.run().await {
        eprintln!("{error}");
        process::exit(1);
    }
}
