//! Order backend errors.

use std::fmt;

use thiserror::Error;

/// Order call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOperation {
    /// `create_order`
    Create,

    /// `update_order`
    Update,
}

impl OrderOperation {
    /// Noun used in shopper-facing messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "creation",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for OrderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures talking to the commerce backend.
#[derive(Debug, Error)]
pub enum OrderBackendError {
    /// The orders endpoint returned 404.
    #[error("order endpoint not found")]
    NotFound,

    /// The consumer key or secret was refused (401 or 403).
    #[error("backend rejected the credentials")]
    Unauthenticated,

    /// Any other non-success status.
    #[error("order {operation} rejected with status {status}")]
    Rejected {
        /// Call that was rejected.
        operation: OrderOperation,

        /// HTTP status code.
        status: u16,

        /// `message` field of the backend's error body, when present.
        message: Option<String>,
    },

    /// The request did not complete within the configured timeout.
    #[error("order request timed out")]
    Timeout,

    /// Connection or protocol failure.
    #[error("transport error")]
    Http(#[source] reqwest::Error),

    /// A success response whose body was not an order.
    #[error("unexpected response from backend")]
    UnexpectedResponse(#[source] reqwest::Error),
}

impl OrderBackendError {
    /// Message suitable for showing to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound => "Order service not found. Please contact support.".to_string(),
            Self::Unauthenticated => "Authentication failed. Please contact support.".to_string(),
            Self::Rejected {
                operation,
                status,
                message: Some(message),
            } => format!("Order {operation} failed: {status} - {message}"),
            Self::Rejected {
                operation,
                status,
                message: None,
            } => format!("Order {operation} failed: {status}"),
            Self::Timeout => "The order service took too long to respond. Please try again.".to_string(),
            Self::Http(_) | Self::UnexpectedResponse(_) => "Please try again".to_string(),
        }
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_status(operation: OrderOperation, status: u16, message: Option<String>) -> Self {
        match status {
            404 => Self::NotFound,
            401 | 403 => Self::Unauthenticated,
            _ => Self::Rejected {
                operation,
                status,
                message,
            },
        }
    }
}

impl From<reqwest::Error> for OrderBackendError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout;
        }

        if error.is_decode() {
            return Self::UnexpectedResponse(error);
        }

        Self::Http(error)
    }
}
