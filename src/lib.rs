//! Storefront
//!
//! Cart-to-order checkout pipeline for a single-currency storefront: a session
//! cart, coupon-aware pricing with a free delivery threshold, an order
//! orchestrator that supports cash on delivery and hosted online payments, and
//! reconciliation of payment outcomes against the commerce backend.

pub mod backend;
pub mod cart;
pub mod checkout;
pub mod coupons;
pub mod fixtures;
pub mod gateway;
pub mod money;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod reconciliation;
pub mod routes;
