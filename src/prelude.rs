//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    backend::{
        CommerceClient, CommerceConfig, ExternalOrder, OrderBackend, OrderBackendError, OrderId,
        OrderRequest, OrderStatus, OrderUpdate,
    },
    cart::{CartLineItem, CartStore},
    checkout::{
        Checkout, CheckoutConfig, CheckoutError, CheckoutOutcome, CheckoutState, FormErrors,
        FormField, PaymentMethod, ShippingForm, validate_form,
    },
    coupons::{Coupon, CouponBook, CouponDiscount, CouponError},
    gateway::{
        GatewayConfig, GatewayError, GatewaySession, OfflineGateway, PaymentGateway,
        PaymentOutcome, PaymentReceipt,
    },
    pricing::{PricingConfig, PricingEngine, PricingError, PricingSnapshot},
    products::{Product, ProductId},
    reconciliation::{Reconciliation, reconcile},
    routes::Route,
};
