//! Order backend
//!
//! The external commerce system that owns orders. Checkout creates orders through
//! it and reconciliation moves them between statuses.

use async_trait::async_trait;
use mockall::automock;

pub mod client;
pub mod errors;
pub mod models;

pub use client::{CommerceClient, CommerceConfig};
pub use errors::{OrderBackendError, OrderOperation};
pub use models::*;

/// Order store.
#[automock]
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderBackendError`] if the backend rejects the order or cannot be reached.
    async fn create_order(&self, request: &OrderRequest) -> Result<ExternalOrder, OrderBackendError>;

    /// Change an order's status, optionally attaching metadata.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderBackendError`] if the backend rejects the update or cannot be reached.
    async fn update_order(
        &self,
        id: OrderId,
        update: &OrderUpdate,
    ) -> Result<ExternalOrder, OrderBackendError>;
}
