//! Payment reconciliation
//!
//! Applies a gateway outcome to its order: moves the order to the matching
//! status, clears the cart on success and picks the shopper's next page. Status
//! updates are attempted once; a failed update is logged and does not change
//! what the shopper sees.

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use tracing::{info, warn};

use crate::{
    backend::{MetaData, OrderBackend, OrderId, OrderStatus, OrderUpdate},
    cart::CartStore,
    gateway::{DEFAULT_FAILURE_REASON, PaymentOutcome, PaymentReceipt},
    money::fixed_amount,
    routes::Route,
};

/// What reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Status the order was moved to.
    pub status: OrderStatus,

    /// Whether the backend accepted the status update.
    pub status_updated: bool,

    /// Whether the cart was emptied.
    pub cart_cleared: bool,

    /// Where to send the shopper.
    pub route: Route,
}

/// Order status matching a gateway outcome.
pub fn status_for(outcome: &PaymentOutcome) -> OrderStatus {
    match outcome {
        PaymentOutcome::Succeeded(_) => OrderStatus::Processing,
        PaymentOutcome::Failed { .. } => OrderStatus::Failed,
        PaymentOutcome::Cancelled => OrderStatus::Cancelled,
    }
}

/// Build the status update for an outcome.
///
/// Successful payments carry the gateway identifiers and capture time as metadata.
pub fn order_update(outcome: &PaymentOutcome, method_code: &str, captured_at: Timestamp) -> OrderUpdate {
    let status = status_for(outcome);

    match outcome {
        PaymentOutcome::Succeeded(receipt) => OrderUpdate {
            status,
            meta_data: receipt_metadata(receipt, method_code, captured_at),
        },
        PaymentOutcome::Failed { .. } | PaymentOutcome::Cancelled => OrderUpdate::status(status),
    }
}

fn receipt_metadata(receipt: &PaymentReceipt, method_code: &str, captured_at: Timestamp) -> Vec<MetaData> {
    vec![
        MetaData::new("razorpay_payment_id", &receipt.payment_id),
        MetaData::new("razorpay_order_id", &receipt.gateway_order_id),
        MetaData::new("razorpay_signature", &receipt.signature),
        MetaData::new("payment_method", method_code),
        MetaData::new("payment_captured_at", captured_at.to_string()),
    ]
}

/// Reconcile a payment outcome with its order.
///
/// Never fails: the gateway's verdict stands even if the backend cannot be updated.
pub async fn reconcile<B>(
    backend: &B,
    cart: &mut CartStore<'_>,
    order_id: OrderId,
    amount: &Money<'_, Currency>,
    outcome: &PaymentOutcome,
    method_code: &str,
) -> Reconciliation
where
    B: OrderBackend + ?Sized,
{
    let update = order_update(outcome, method_code, Timestamp::now());
    let status = update.status;

    let status_updated = match backend.update_order(order_id, &update).await {
        Ok(order) => {
            info!(order_id = %order_id, status = %order.status, "order reconciled");
            true
        }
        Err(error) => {
            warn!(order_id = %order_id, status = %status, error = %error, "failed to update order status");
            false
        }
    };

    let cart_cleared = matches!(outcome, PaymentOutcome::Succeeded(_));
    if cart_cleared {
        cart.clear();
    }

    let route = match outcome {
        PaymentOutcome::Succeeded(receipt) => Route::OrderConfirmation {
            order_id,
            payment_id: Some(receipt.payment_id.clone()),
            cod: false,
        },
        PaymentOutcome::Failed { .. } | PaymentOutcome::Cancelled => Route::PaymentFailed {
            error: outcome
                .failure_reason()
                .unwrap_or(DEFAULT_FAILURE_REASON)
                .to_string(),
            order_id: Some(order_id),
            amount: fixed_amount(amount),
        },
    };

    Reconciliation {
        status,
        status_updated,
        cart_cleared,
        route,
    }
}
