//! Storefront operator CLI

use std::process;

use tracing::error;

use crate::cli::{
    commands,
    config::{Command, StorefrontConfig},
    observability,
};

mod cli;

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::load().unwrap_or_else(|e| e.exit());

    if let Err(e) = observability::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for subscriber errors"
        )]
        {
            eprintln!("Logging error: {e}");
        }

        process::exit(1);
    }

    let result = match &config.command {
        Command::Quote(args) => commands::quote(args, &config.pricing),
        Command::Checkout(args) => commands::checkout(args, &config.pricing).await,
        Command::Reconcile(args) => commands::reconcile_order(args).await,
    };

    if let Err(e) = result {
        error!("{e}");

        process::exit(1);
    }
}
