//! Order Models
//!
//! Wire shapes for the commerce backend's order endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::products::ProductId;

/// Identifier assigned to an order by the commerce backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Wrap a backend order id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw backend id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Order lifecycle status on the commerce backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Created, awaiting payment.
    Pending,

    /// Paid (or cash on delivery) and ready to fulfil.
    Processing,

    /// Held for manual review.
    OnHold,

    /// Fulfilled.
    Completed,

    /// Abandoned by the shopper.
    Cancelled,

    /// Money returned.
    Refunded,

    /// Payment attempt failed.
    Failed,
}

impl OrderStatus {
    /// Status as spelled on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing or shipping address.
///
/// Email and phone are only sent with the billing address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    /// Full name as entered; the form has a single name field.
    pub first_name: String,

    /// Always empty.
    pub last_name: String,

    /// Street address.
    pub address_1: String,

    /// Second address line.
    pub address_2: String,

    /// City.
    pub city: String,

    /// State or province.
    pub state: String,

    /// Postal code.
    pub postcode: String,

    /// ISO country code.
    pub country: String,

    /// Contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Line item reference; the backend prices lines from its own catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineItemRequest {
    /// Backend product id.
    pub product_id: ProductId,

    /// Units ordered.
    pub quantity: u32,
}

/// Delivery charge line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingLine {
    /// Shipping method id, e.g. `flat_rate`.
    pub method_id: String,

    /// Shipping method label.
    pub method_title: String,

    /// Charge in major units.
    pub total: String,
}

/// Applied coupon line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponLine {
    /// Lower-cased coupon code.
    pub code: String,

    /// Discount in major units.
    pub discount: String,
}

/// Free-form key/value attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData {
    /// Entry name.
    pub key: String,

    /// Entry value.
    pub value: String,
}

impl MetaData {
    /// Create an entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Order creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Payment method code, e.g. `cod`.
    pub payment_method: String,

    /// Payment method label shown on the order.
    pub payment_method_title: String,

    /// Initial status: `processing` for cash on delivery, `pending` otherwise.
    pub status: OrderStatus,

    /// Billing address, with email and phone.
    pub billing: Address,

    /// Shipping address.
    pub shipping: Address,

    /// Ordered products.
    pub line_items: Vec<LineItemRequest>,

    /// Delivery charge, when there is one.
    pub shipping_lines: Vec<ShippingLine>,

    /// Qualifying coupon, when there is one.
    pub coupon_lines: Vec<CouponLine>,

    /// Note shown to the merchant.
    pub customer_note: String,

    /// Totals and contact details duplicated for the merchant.
    pub meta_data: Vec<MetaData>,
}

impl OrderRequest {
    /// Value of a metadata entry.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta_data
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }
}

/// Order status update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderUpdate {
    /// New status.
    pub status: OrderStatus,

    /// Entries to add to the order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meta_data: Vec<MetaData>,
}

impl OrderUpdate {
    /// Status change without metadata.
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status,
            meta_data: Vec::new(),
        }
    }
}

/// Order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalOrder {
    /// Backend order id.
    pub id: OrderId,

    /// Current status.
    pub status: OrderStatus,

    /// Order total in major units, as formatted by the backend.
    #[serde(default)]
    pub total: String,

    /// Key used by the backend's own order pages.
    #[serde(default)]
    pub order_key: Option<String>,
}
