//! Checkout
//!
//! Turns a cart, a pricing snapshot and a shipping form into an order on the
//! commerce backend, then drives payment collection for online orders.

use jiff::Timestamp;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    backend::{OrderBackend, OrderBackendError, OrderId, OrderStatus, OrderUpdate},
    cart::CartStore,
    gateway::{GatewayConfig, GatewayError, GatewaySession, PaymentGateway, PaymentOutcome, Prefill, Theme},
    pricing::{PricingEngine, PricingError, PricingSnapshot},
    reconciliation::reconcile,
    routes::Route,
};

pub mod form;
mod order;
pub mod state;

pub use form::{FormErrors, FormField, ShippingForm, validate_form};
pub use state::{CheckoutState, StateTransition};

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Pay the courier on delivery.
    CashOnDelivery,

    /// Pay now through the hosted gateway.
    Online,
}

/// Static checkout settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// ISO country code for billing and shipping addresses.
    pub country: String,

    /// Shipping method id for the delivery charge line.
    pub delivery_method_id: String,

    /// Shipping method label for the delivery charge line.
    pub delivery_method_title: String,

    /// Payment method code for cash on delivery orders.
    pub cod_method_code: String,

    /// Payment method label for cash on delivery orders.
    pub cod_method_title: String,

    /// Gift included once per unit ordered, e.g. `"10ml perfume"`.
    pub free_gift: Option<String>,

    /// Online payment settings.
    pub gateway: GatewayConfig,
}

impl CheckoutConfig {
    /// The storefront's standard settings.
    pub fn new(gateway: GatewayConfig) -> Self {
        Self {
            country: "IN".to_string(),
            delivery_method_id: "flat_rate".to_string(),
            delivery_method_title: "Premium Delivery".to_string(),
            cod_method_code: "cod".to_string(),
            cod_method_title: "Cash on Delivery (COD)".to_string(),
            free_gift: Some("10ml perfume".to_string()),
            gateway,
        }
    }
}

/// Reasons a submission did not produce an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The form has invalid fields.
    #[error("invalid shipping details: {0}")]
    Validation(FormErrors),

    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// An earlier submission has not settled.
    #[error("checkout already in progress ({state})")]
    InProgress {
        /// State the checkout is in.
        state: CheckoutState,
    },

    /// This checkout already placed an order.
    #[error("order already placed")]
    AlreadyCompleted,

    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The order could not be created.
    #[error(transparent)]
    Backend(#[from] OrderBackendError),

    /// The payment session could not be opened.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The state machine refused a transition.
    #[error("cannot move checkout from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: CheckoutState,

        /// Requested state.
        to: CheckoutState,
    },
}

impl CheckoutError {
    /// Message suitable for showing to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_) => "Please fix the errors".to_string(),
            Self::EmptyCart => "Your cart is empty".to_string(),
            Self::InProgress { .. } => "Your order is already being placed".to_string(),
            Self::AlreadyCompleted => "Your order has already been placed".to_string(),
            Self::Backend(error) => error.user_message(),
            Self::Gateway(error) => error.user_message().to_string(),
            Self::Pricing(_) | Self::InvalidTransition { .. } => "Please try again".to_string(),
        }
    }
}

/// Result of a completed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    /// Backend order id.
    pub order_id: OrderId,

    /// State the checkout settled in.
    pub state: CheckoutState,

    /// Gateway outcome; `None` for cash on delivery.
    pub payment: Option<PaymentOutcome>,

    /// Whether the cart was emptied.
    pub cart_cleared: bool,

    /// Where to send the shopper.
    pub route: Route,
}

/// Checkout Orchestrator
#[derive(Debug)]
pub struct Checkout<B, G> {
    backend: B,
    gateway: G,
    config: CheckoutConfig,
    state: CheckoutState,
    history: Vec<StateTransition>,
    pending_order: Option<OrderId>,
}

impl<B, G> Checkout<B, G>
where
    B: OrderBackend,
    G: PaymentGateway,
{
    /// Create a checkout in the editing state.
    pub fn new(backend: B, gateway: G, config: CheckoutConfig) -> Self {
        Self {
            backend,
            gateway,
            config,
            state: CheckoutState::Editing,
            history: Vec::new(),
            pending_order: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Every transition so far, oldest first.
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Settings in use.
    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Order backend in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Submit the cart as an order.
    ///
    /// Validation happens before any external call. Cash on delivery orders are
    /// created as `processing` and complete immediately; online orders are created
    /// as `pending` and then paid through the gateway, whose outcome is reconciled
    /// against the order before returning.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::AlreadyCompleted`]: this checkout already placed an order.
    /// - [`CheckoutError::InProgress`]: another submission has not settled.
    /// - [`CheckoutError::EmptyCart`]: nothing to order.
    /// - [`CheckoutError::Validation`]: the form has invalid fields.
    /// - [`CheckoutError::Pricing`]: the cart could not be priced.
    /// - [`CheckoutError::Backend`]: the order could not be created.
    /// - [`CheckoutError::Gateway`]: the payment session could not be opened; the
    ///   order is cancelled.
    pub async fn submit<'a>(
        &mut self,
        cart: &mut CartStore<'a>,
        pricing: &PricingEngine<'a>,
        form: &ShippingForm,
        method: PaymentMethod,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        self.ensure_can_submit()?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        validate_form(form).map_err(CheckoutError::Validation)?;

        let form = form.trimmed();
        let snapshot = pricing.quote(cart)?;
        let request = order::build_order_request(&form, cart, &snapshot, method, &self.config);

        self.transition(CheckoutState::Submitting)?;

        let order = match self.backend.create_order(&request).await {
            Ok(order) => order,
            Err(error) => {
                warn!(error = %error, "order creation failed");
                self.fail_submission()?;

                return Err(error.into());
            }
        };

        info!(order_id = %order.id, ?method, "order created");

        self.pending_order = Some(order.id);
        self.transition(CheckoutState::OrderCreated)?;

        match method {
            PaymentMethod::CashOnDelivery => {
                self.pending_order = None;
                self.transition(CheckoutState::PaymentSucceeded)?;
                cart.clear();

                Ok(CheckoutOutcome {
                    order_id: order.id,
                    state: self.state,
                    payment: None,
                    cart_cleared: true,
                    route: Route::OrderConfirmation {
                        order_id: order.id,
                        payment_id: None,
                        cod: true,
                    },
                })
            }
            PaymentMethod::Online => self.collect_payment(cart, &form, order.id, &snapshot).await,
        }
    }

    async fn collect_payment(
        &mut self,
        cart: &mut CartStore<'_>,
        form: &ShippingForm,
        order_id: OrderId,
        snapshot: &PricingSnapshot<'_>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let session = self.session(form, order_id, snapshot);

        self.transition(CheckoutState::AwaitingPayment)?;

        let outcome = match self.gateway.collect(session).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(order_id = %order_id, error = %error, "payment session failed to open");
                self.pending_order = None;
                self.cancel_orphaned(order_id).await;
                self.fail_submission()?;

                return Err(error.into());
            }
        };

        self.pending_order = None;

        let reconciliation = reconcile(
            &self.backend,
            cart,
            order_id,
            &snapshot.final_total,
            &outcome,
            &self.config.gateway.method_code,
        )
        .await;

        let next = match outcome {
            PaymentOutcome::Succeeded(_) => CheckoutState::PaymentSucceeded,
            PaymentOutcome::Failed { .. } => CheckoutState::PaymentFailed,
            PaymentOutcome::Cancelled => CheckoutState::PaymentCancelled,
        };

        self.transition(next)?;

        Ok(CheckoutOutcome {
            order_id,
            state: self.state,
            payment: Some(outcome),
            cart_cleared: reconciliation.cart_cleared,
            route: reconciliation.route,
        })
    }

    /// Give up on a submission that never settled.
    ///
    /// A `submit` future dropped part way (behind a timeout, or when the shopper's
    /// session ends) leaves the checkout in progress. This cancels the order it had
    /// created, if any, and returns the checkout to editing. The cancellation is
    /// best-effort; a backend failure is logged and the checkout is reset anyway.
    ///
    /// Returns the abandoned order id. Does nothing when no submission is in
    /// progress.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] if the state machine rejects
    /// the reset.
    pub async fn abandon(&mut self) -> Result<Option<OrderId>, CheckoutError> {
        if !self.state.is_in_progress() {
            return Ok(None);
        }

        let order_id = self.pending_order.take();

        if let Some(order_id) = order_id {
            warn!(order_id = %order_id, state = %self.state, "abandoning unsettled checkout");
            self.cancel_orphaned(order_id).await;
        } else {
            warn!(state = %self.state, "abandoning checkout before an order was created");
        }

        self.fail_submission()?;

        Ok(order_id)
    }

    fn session(
        &self,
        form: &ShippingForm,
        order_id: OrderId,
        snapshot: &PricingSnapshot<'_>,
    ) -> GatewaySession {
        let gateway = &self.config.gateway;

        GatewaySession {
            key: gateway.key_id.clone(),
            amount: snapshot.final_total.to_minor_units(),
            currency: snapshot.final_total.currency().iso_alpha_code.to_string(),
            name: gateway.merchant_name.clone(),
            description: format!("Order #{order_id}"),
            prefill: Prefill {
                name: form.name.clone(),
                email: form.email.clone(),
                contact: form.phone.clone(),
            },
            theme: Theme {
                color: gateway.theme_color.clone(),
            },
            retry: gateway.retry,
        }
    }

    async fn cancel_orphaned(&self, order_id: OrderId) {
        let update = OrderUpdate::status(OrderStatus::Cancelled);

        if let Err(error) = self.backend.update_order(order_id, &update).await {
            warn!(order_id = %order_id, error = %error, "failed to cancel orphaned order");
        }
    }

    fn ensure_can_submit(&mut self) -> Result<(), CheckoutError> {
        match self.state {
            CheckoutState::PaymentSucceeded => Err(CheckoutError::AlreadyCompleted),
            state if state.is_in_progress() => Err(CheckoutError::InProgress { state }),
            CheckoutState::PaymentFailed
            | CheckoutState::PaymentCancelled
            | CheckoutState::SubmissionFailed => self.transition(CheckoutState::Editing),
            _ => Ok(()),
        }
    }

    fn fail_submission(&mut self) -> Result<(), CheckoutError> {
        self.transition(CheckoutState::SubmissionFailed)?;
        self.transition(CheckoutState::Editing)
    }

    fn transition(&mut self, to: CheckoutState) -> Result<(), CheckoutError> {
        let from = self.state;

        if !from.can_transition_to(to) {
            return Err(CheckoutError::InvalidTransition { from, to });
        }

        self.history.push(StateTransition {
            from,
            to,
            at: Timestamp::now(),
        });
        self.state = to;

        Ok(())
    }
}
