//! Routes
//!
//! Where the shopper is sent once checkout settles.

use std::fmt;

use url::form_urlencoded::Serializer;

use crate::backend::OrderId;

/// Storefront page reached at the end of checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Order placed.
    OrderConfirmation {
        /// Backend order id.
        order_id: OrderId,

        /// Gateway payment id, absent for cash on delivery.
        payment_id: Option<String>,

        /// Order placed as cash on delivery.
        cod: bool,
    },

    /// Payment did not complete.
    PaymentFailed {
        /// Reason shown to the shopper.
        error: String,

        /// Backend order id, when an order was created.
        order_id: Option<OrderId>,

        /// Attempted amount in major units with full precision, e.g. `"540.00"`.
        amount: String,
    },
}

impl Route {
    /// Path and query string, e.g. `/order-confirmation?wcOrderId=12&cod=true`.
    pub fn path(&self) -> String {
        let mut query = Serializer::new(String::new());

        let base = match self {
            Self::OrderConfirmation {
                order_id,
                payment_id,
                cod,
            } => {
                if let Some(payment_id) = payment_id {
                    query.append_pair("orderId", payment_id);
                }

                query.append_pair("wcOrderId", &order_id.to_string());

                if *cod {
                    query.append_pair("cod", "true");
                }

                "/order-confirmation"
            }
            Self::PaymentFailed {
                error,
                order_id,
                amount,
            } => {
                query.append_pair("error", error);

                if let Some(order_id) = order_id {
                    query.append_pair("wcOrderId", &order_id.to_string());
                }

                query.append_pair("amount", amount);

                "/payment-failed"
            }
        };

        format!("{base}?{}", query.finish())
    }

    /// Check if this is a confirmation route.
    pub fn is_confirmation(&self) -> bool {
        matches!(self, Self::OrderConfirmation { .. })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
