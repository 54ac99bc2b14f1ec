//! Payment gateway
//!
//! The hosted payment widget is modelled as an asynchronous collaborator: checkout
//! opens a session for a created order and the session eventually resolves to a
//! single [`PaymentOutcome`].

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use thiserror::Error;

/// Default number of in-widget retries offered to the shopper.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Description used when the gateway reports a failure without one.
pub const DEFAULT_FAILURE_REASON: &str = "Payment was not successful";

/// Description used when the shopper dismisses the payment widget.
pub const CANCELLED_REASON: &str = "Payment was cancelled by user";

/// In-widget retry behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    /// Offer retries at all.
    pub enabled: bool,

    /// Attempts offered before the widget gives up.
    pub max_count: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_count: DEFAULT_RETRY_COUNT,
        }
    }
}

/// Static gateway settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Publishable key identifying the merchant account.
    pub key_id: String,

    /// Merchant name shown in the widget.
    pub merchant_name: String,

    /// Widget accent colour.
    pub theme_color: String,

    /// Payment method code recorded on orders.
    pub method_code: String,

    /// Payment method title recorded on orders.
    pub method_title: String,

    /// In-widget retries.
    pub retry: RetryPolicy,
}

impl GatewayConfig {
    /// Settings for a merchant account with the storefront's defaults.
    pub fn new(key_id: impl Into<String>, merchant_name: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            merchant_name: merchant_name.into(),
            theme_color: "#000000".to_string(),
            method_code: "razorpay".to_string(),
            method_title: "Razorpay (Credit Card/Debit Card/NetBanking/UPI)".to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Shopper details pre-filled into the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prefill {
    /// Shopper name.
    pub name: String,

    /// Shopper email.
    pub email: String,

    /// Shopper phone number.
    pub contact: String,
}

/// Widget appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    /// Accent colour as a CSS hex string.
    pub color: String,
}

/// A request to collect payment for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewaySession {
    /// Merchant key.
    pub key: String,

    /// Amount in minor currency units.
    pub amount: i64,

    /// ISO currency code.
    pub currency: String,

    /// Merchant name.
    pub name: String,

    /// `Order #<id>`.
    pub description: String,

    /// Shopper details.
    pub prefill: Prefill,

    /// Widget appearance.
    pub theme: Theme,

    /// In-widget retries.
    pub retry: RetryPolicy,
}

/// Proof of a successful payment returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Gateway payment id.
    pub payment_id: String,

    /// Gateway-side order id.
    pub gateway_order_id: String,

    /// Signature over the payment and order ids.
    pub signature: String,
}

/// How a payment session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The shopper paid.
    Succeeded(PaymentReceipt),

    /// The gateway reported a failure, with its description when it gave one.
    Failed {
        /// Gateway's description of the failure.
        reason: Option<String>,
    },

    /// The shopper dismissed the widget.
    Cancelled,
}

impl PaymentOutcome {
    /// Description shown to the shopper for an unsuccessful outcome.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed { reason } => Some(
                reason
                    .as_deref()
                    .filter(|reason| !reason.trim().is_empty())
                    .unwrap_or(DEFAULT_FAILURE_REASON),
            ),
            Self::Cancelled => Some(CANCELLED_REASON),
        }
    }
}

/// Failures opening a payment session.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The session could not be opened, with the cause.
    #[error("payment system unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// Message suitable for showing to the shopper.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "Failed to load payment system. Please refresh the page.",
        }
    }
}

/// Hosted payment collection.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a session and wait for it to resolve.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unavailable`] if the session could not be opened.
    async fn collect(&self, session: GatewaySession) -> Result<PaymentOutcome, GatewayError>;
}

/// Gateway for storefronts that only take cash on delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGateway;

#[async_trait]
impl PaymentGateway for OfflineGateway {
    async fn collect(&self, _session: GatewaySession) -> Result<PaymentOutcome, GatewayError> {
        Err(GatewayError::Unavailable(
            "online payments are not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn failed_without_description_uses_fallback() {
        let outcome = PaymentOutcome::Failed { reason: None };

        assert_eq!(outcome.failure_reason(), Some("Payment was not successful"));
    }

    #[test]
    fn failed_with_blank_description_uses_fallback() {
        let outcome = PaymentOutcome::Failed {
            reason: Some("  ".to_string()),
        };

        assert_eq!(outcome.failure_reason(), Some(DEFAULT_FAILURE_REASON));
    }

    #[test]
    fn gateway_description_is_kept() {
        let outcome = PaymentOutcome::Failed {
            reason: Some("Card declined".to_string()),
        };

        assert_eq!(outcome.failure_reason(), Some("Card declined"));
    }

    #[test]
    fn cancellation_reason() {
        assert_eq!(PaymentOutcome::Cancelled.failure_reason(), Some(CANCELLED_REASON));
    }

    #[test]
    fn session_serialises_widget_options() -> TestResult {
        let config = GatewayConfig::new("rzp_test_key", "Attar House");
        let session = GatewaySession {
            key: config.key_id.clone(),
            amount: 540_00,
            currency: "INR".to_string(),
            name: config.merchant_name.clone(),
            description: "Order #77".to_string(),
            prefill: Prefill {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                contact: "9876543210".to_string(),
            },
            theme: Theme {
                color: config.theme_color.clone(),
            },
            retry: config.retry,
        };

        let body = serde_json::to_value(&session)?;

        assert_eq!(body.get("amount"), Some(&json!(54000)));
        assert_eq!(body.get("retry"), Some(&json!({ "enabled": true, "max_count": 3 })));
        assert_eq!(body.pointer("/theme/color"), Some(&json!("#000000")));

        Ok(())
    }
}
