//! Operator commands.

use std::io::{self, Write};

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{info, warn};

use storefront::{
    backend::{CommerceClient, OrderBackendError, OrderId},
    cart::CartStore,
    checkout::{Checkout, CheckoutConfig, CheckoutError, PaymentMethod},
    coupons::CouponBook,
    fixtures::{self, FixtureError},
    gateway::{GatewayConfig, OfflineGateway, PaymentOutcome, PaymentReceipt},
    money::from_major,
    pricing::{PricingConfig, PricingEngine, PricingError},
    receipt::{self, ReceiptError},
    reconciliation::reconcile,
};

use crate::cli::config::{CheckoutArgs, PricingArgs, QuoteArgs, ReconcileArgs};

/// Errors surfaced by operator commands.
#[derive(Debug, Error)]
pub(crate) enum CommandError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error(transparent)]
    Backend(#[from] OrderBackendError),

    #[error("{}", .0.user_message())]
    Checkout(#[from] CheckoutError),

    #[error("failed to write output")]
    Io(#[from] io::Error),
}

/// Price a cart and print the totals.
pub(crate) fn quote(args: &QuoteArgs, pricing: &PricingArgs) -> Result<(), CommandError> {
    let fixture = fixtures::load_cart(&args.cart)?;
    let coupon = args.coupon.clone().or_else(|| fixture.coupon.clone());
    let cart = fixture.into_cart()?;

    let mut engine = pricing_engine(pricing, cart.currency());
    apply_coupon(&mut engine, coupon.as_deref(), &cart);

    let snapshot = engine.quote(&cart)?;

    receipt::write_to(io::stdout().lock(), &cart, &snapshot)?;

    Ok(())
}

/// Place a cash on delivery order and print the confirmation route.
pub(crate) async fn checkout(args: &CheckoutArgs, pricing: &PricingArgs) -> Result<(), CommandError> {
    let (fixture, form) = (fixtures::load_cart(&args.cart)?, fixtures::load_customer(&args.customer)?);
    let coupon = args.coupon.clone().or_else(|| fixture.coupon.clone());
    let mut cart = fixture.into_cart()?;

    let mut engine = pricing_engine(pricing, cart.currency());
    apply_coupon(&mut engine, coupon.as_deref(), &cart);

    let client = CommerceClient::new(args.commerce.to_config())?;
    let config = CheckoutConfig::new(GatewayConfig::new(
        &args.gateway.gateway_key_id,
        &args.gateway.merchant_name,
    ));

    let mut checkout = Checkout::new(client, OfflineGateway, config);

    let outcome = checkout
        .submit(&mut cart, &engine, &form, PaymentMethod::CashOnDelivery)
        .await?;

    info!(order_id = %outcome.order_id, "cash on delivery order placed");

    writeln!(io::stdout().lock(), "{}", outcome.route)?;

    Ok(())
}

/// Apply a gateway outcome to an existing order and print the resulting route.
pub(crate) async fn reconcile_order(args: &ReconcileArgs) -> Result<(), CommandError> {
    let (minor, currency) = fixtures::parse_price(&args.amount)?;
    let amount = Money::from_minor(minor, currency);

    let outcome = if args.paid {
        PaymentOutcome::Succeeded(PaymentReceipt {
            payment_id: args.payment_id.clone().unwrap_or_default(),
            gateway_order_id: args.gateway_order_id.clone(),
            signature: args.signature.clone(),
        })
    } else if args.failed {
        PaymentOutcome::Failed {
            reason: args.reason.clone(),
        }
    } else {
        PaymentOutcome::Cancelled
    };

    let client = CommerceClient::new(args.commerce.to_config())?;
    let method_code = GatewayConfig::new("", "").method_code;

    // No shopper session out of band, so the cart is always empty.
    let mut cart = CartStore::new(currency);

    let result = reconcile(
        &client,
        &mut cart,
        OrderId::new(args.order_id),
        &amount,
        &outcome,
        &method_code,
    )
    .await;

    if !result.status_updated {
        warn!(order_id = args.order_id, status = %result.status, "order status was not updated");
    }

    writeln!(io::stdout().lock(), "{}", result.route)?;

    Ok(())
}

fn pricing_engine(args: &PricingArgs, currency: &'static Currency) -> PricingEngine<'static> {
    let config = PricingConfig {
        free_delivery_threshold: from_major(i64::from(args.free_delivery_threshold), currency),
        delivery_fee: from_major(i64::from(args.delivery_fee), currency),
    };

    PricingEngine::new(config, CouponBook::standard(currency))
}

fn apply_coupon<'a>(engine: &mut PricingEngine<'a>, code: Option<&str>, cart: &CartStore<'a>) {
    let Some(code) = code else {
        return;
    };

    match engine.apply_coupon(code, cart) {
        Ok(snapshot) => info!(coupon = %code, discount = %snapshot.coupon_discount, "coupon applied"),
        Err(error) => warn!(coupon = %code, error = %error, "coupon not applied"),
    }
}
