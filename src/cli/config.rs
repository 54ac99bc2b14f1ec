//! Operator CLI configuration

use std::{path::PathBuf, time::Duration};

use clap::{ArgGroup, Args, Parser, Subcommand};

use storefront::{
    backend::{CommerceConfig, client::DEFAULT_TIMEOUT},
    pricing::{DELIVERY_FEE, FREE_DELIVERY_THRESHOLD},
};

/// Storefront checkout operator tool
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront checkout operator tool", long_about = None)]
pub struct StorefrontConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Delivery pricing overrides.
    #[command(flatten)]
    pub pricing: PricingArgs,

    #[command(subcommand)]
    pub command: Command,
}

impl StorefrontConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Delivery pricing settings, in major currency units.
#[derive(Debug, Args)]
pub struct PricingArgs {
    /// Subtotal at which delivery becomes free
    #[arg(long, env = "FREE_DELIVERY_THRESHOLD", default_value_t = FREE_DELIVERY_THRESHOLD, global = true)]
    pub free_delivery_threshold: u32,

    /// Delivery fee below the threshold
    #[arg(long, env = "DELIVERY_FEE", default_value_t = DELIVERY_FEE, global = true)]
    pub delivery_fee: u32,
}

/// Commerce backend connection settings.
#[derive(Debug, Args)]
pub struct CommerceArgs {
    /// Commerce site root URL
    #[arg(long, env = "COMMERCE_BASE_URL")]
    pub commerce_base_url: String,

    /// REST consumer key
    #[arg(long, env = "COMMERCE_CONSUMER_KEY", hide_env_values = true)]
    pub commerce_consumer_key: String,

    /// REST consumer secret
    #[arg(long, env = "COMMERCE_CONSUMER_SECRET", hide_env_values = true)]
    pub commerce_consumer_secret: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "COMMERCE_TIMEOUT_SECONDS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub commerce_timeout_seconds: u64,
}

impl CommerceArgs {
    /// Client settings for these arguments.
    pub fn to_config(&self) -> CommerceConfig {
        CommerceConfig {
            timeout: Duration::from_secs(self.commerce_timeout_seconds),
            ..CommerceConfig::new(
                &self.commerce_base_url,
                &self.commerce_consumer_key,
                &self.commerce_consumer_secret,
            )
        }
    }
}

/// Payment gateway identity.
#[derive(Debug, Args)]
pub struct GatewayArgs {
    /// Gateway publishable key
    #[arg(long, env = "GATEWAY_KEY_ID", default_value = "")]
    pub gateway_key_id: String,

    /// Merchant name shown to shoppers
    #[arg(long, env = "MERCHANT_NAME", default_value = "Storefront")]
    pub merchant_name: String,
}

/// Operator commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price a cart and print the totals
    Quote(QuoteArgs),

    /// Place a cash on delivery order for a cart
    Checkout(CheckoutArgs),

    /// Apply a payment outcome to an existing order
    Reconcile(ReconcileArgs),
}

/// `quote` arguments.
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Cart YAML file
    #[arg(long)]
    pub cart: PathBuf,

    /// Coupon code, overriding the one in the cart file
    #[arg(long)]
    pub coupon: Option<String>,
}

/// `checkout` arguments.
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Cart YAML file
    #[arg(long)]
    pub cart: PathBuf,

    /// Customer YAML file
    #[arg(long)]
    pub customer: PathBuf,

    /// Coupon code, overriding the one in the cart file
    #[arg(long)]
    pub coupon: Option<String>,

    #[command(flatten)]
    pub commerce: CommerceArgs,

    #[command(flatten)]
    pub gateway: GatewayArgs,
}

/// `reconcile` arguments.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("outcome").required(true).args(["paid", "failed", "cancelled"])))]
pub struct ReconcileArgs {
    /// Backend order id
    #[arg(long)]
    pub order_id: u64,

    /// Attempted amount, e.g. "540 INR"
    #[arg(long)]
    pub amount: String,

    /// The payment succeeded
    #[arg(long, requires = "payment_id")]
    pub paid: bool,

    /// The payment failed
    #[arg(long)]
    pub failed: bool,

    /// The shopper cancelled the payment
    #[arg(long)]
    pub cancelled: bool,

    /// Gateway payment id
    #[arg(long)]
    pub payment_id: Option<String>,

    /// Gateway order id
    #[arg(long, default_value = "")]
    pub gateway_order_id: String,

    /// Gateway signature
    #[arg(long, default_value = "")]
    pub signature: String,

    /// Gateway failure description
    #[arg(long)]
    pub reason: Option<String>,

    #[command(flatten)]
    pub commerce: CommerceArgs,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        StorefrontConfig::command().debug_assert();
    }

    #[test]
    fn reconcile_requires_an_outcome() {
        let result = StorefrontConfig::try_parse_from([
            "storefront",
            "reconcile",
            "--order-id",
            "12",
            "--amount",
            "540 INR",
            "--commerce-base-url",
            "https://shop.example.com",
            "--commerce-consumer-key",
            "ck",
            "--commerce-consumer-secret",
            "cs",
        ]);

        assert!(result.is_err(), "an outcome flag is required");
    }

    #[test]
    fn negative_delivery_fee_is_rejected() {
        let result = StorefrontConfig::try_parse_from([
            "storefront",
            "quote",
            "--cart",
            "fixtures/carts/first-order.yml",
            "--delivery-fee=-100",
        ]);

        assert!(result.is_err(), "delivery fee must not be negative");
    }

    #[test]
    fn quote_parses_with_defaults() -> TestResult {
        let config = StorefrontConfig::try_parse_from([
            "storefront",
            "quote",
            "--cart",
            "fixtures/carts/first-order.yml",
        ])?;

        assert_eq!(config.pricing.free_delivery_threshold, FREE_DELIVERY_THRESHOLD);
        assert!(matches!(config.command, Command::Quote(QuoteArgs { coupon: None, .. })));

        Ok(())
    }
}
