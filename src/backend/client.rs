//! Commerce REST client.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::backend::{
    OrderBackend,
    errors::{OrderBackendError, OrderOperation},
    models::{ExternalOrder, OrderId, OrderRequest, OrderUpdate},
};

/// Default bound on a single backend request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ORDERS_PATH: &str = "wp-json/wc/v3/orders";

/// Connection settings for the commerce backend.
#[derive(Clone)]
pub struct CommerceConfig {
    /// Site root, e.g. `https://shop.example.com`.
    pub base_url: String,

    /// REST consumer key.
    pub consumer_key: String,

    /// REST consumer secret.
    pub consumer_secret: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl CommerceConfig {
    /// Settings with the default timeout.
    pub fn new(
        base_url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn orders_url(&self) -> String {
        format!("{}/{ORDERS_PATH}", self.base_url.trim_end_matches('/'))
    }

    fn order_url(&self, id: OrderId) -> String {
        format!("{}/{id}", self.orders_url())
    }
}

impl fmt::Debug for CommerceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommerceConfig")
            .field("base_url", &self.base_url)
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Order backend over the commerce REST API.
#[derive(Debug, Clone)]
pub struct CommerceClient {
    config: CommerceConfig,
    http: Client,
}

impl CommerceClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns [`OrderBackendError::Http`] if the HTTP client cannot be constructed.
    pub fn new(config: CommerceConfig) -> Result<Self, OrderBackendError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(OrderBackendError::Http)?;

        Ok(Self { config, http })
    }

    /// Connection settings in use.
    pub fn config(&self) -> &CommerceConfig {
        &self.config
    }

    fn authenticated(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(
            &self.config.consumer_key,
            Some(&self.config.consumer_secret),
        )
    }

    async fn read_order(
        operation: OrderOperation,
        response: Response,
    ) -> Result<ExternalOrder, OrderBackendError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|error| {
                debug!(status = status.as_u16(), error = %error, "failed to read error body");
                String::new()
            });
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.message);

            warn!(%operation, status = status.as_u16(), ?message, "order request rejected");

            return Err(OrderBackendError::from_status(operation, status.as_u16(), message));
        }

        Ok(response.json::<ExternalOrder>().await?)
    }
}

#[async_trait]
impl OrderBackend for CommerceClient {
    async fn create_order(&self, request: &OrderRequest) -> Result<ExternalOrder, OrderBackendError> {
        let response = self
            .authenticated(self.http.post(self.config.orders_url()))
            .json(request)
            .send()
            .await?;

        let order = Self::read_order(OrderOperation::Create, response).await?;

        info!(order_id = %order.id, status = %order.status, "order created");

        Ok(order)
    }

    async fn update_order(
        &self,
        id: OrderId,
        update: &OrderUpdate,
    ) -> Result<ExternalOrder, OrderBackendError> {
        let response = self
            .authenticated(self.http.put(self.config.order_url(id)))
            .json(update)
            .send()
            .await?;

        let order = Self::read_order(OrderOperation::Update, response).await?;

        info!(order_id = %order.id, status = %order.status, "order updated");

        Ok(order)
    }
}
