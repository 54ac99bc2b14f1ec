//! Checkout state machine.

use std::fmt;

use jiff::Timestamp;

/// Position of a checkout in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckoutState {
    /// Shopper is filling in the form.
    #[default]
    Editing,

    /// Order request sent, waiting on the backend.
    Submitting,

    /// Backend accepted the order.
    OrderCreated,

    /// Gateway session open.
    AwaitingPayment,

    /// Paid, or confirmed for cash on delivery.
    PaymentSucceeded,

    /// Gateway reported a failure.
    PaymentFailed,

    /// Shopper dismissed the payment widget.
    PaymentCancelled,

    /// Order creation or payment session failed; returns to editing.
    SubmissionFailed,
}

impl CheckoutState {
    /// Name for display and logging.
    pub fn name(self) -> &'static str {
        match self {
            Self::Editing => "Editing",
            Self::Submitting => "Submitting",
            Self::OrderCreated => "OrderCreated",
            Self::AwaitingPayment => "AwaitingPayment",
            Self::PaymentSucceeded => "PaymentSucceeded",
            Self::PaymentFailed => "PaymentFailed",
            Self::PaymentCancelled => "PaymentCancelled",
            Self::SubmissionFailed => "SubmissionFailed",
        }
    }

    /// Terminal for the current attempt; nothing moves forward without a new submission.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            Self::PaymentSucceeded | Self::PaymentFailed | Self::PaymentCancelled
        )
    }

    /// Check if this state records a failure.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::PaymentFailed | Self::PaymentCancelled | Self::SubmissionFailed
        )
    }

    /// A submission is in flight and another must not start.
    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            Self::Submitting | Self::OrderCreated | Self::AwaitingPayment
        )
    }

    /// Check whether moving to `next` is allowed.
    pub fn can_transition_to(self, next: Self) -> bool {
        use CheckoutState::{
            AwaitingPayment, Editing, OrderCreated, PaymentCancelled, PaymentFailed,
            PaymentSucceeded, SubmissionFailed, Submitting,
        };

        matches!(
            (self, next),
            (Editing, Submitting)
                | (Submitting, OrderCreated | SubmissionFailed)
                | (OrderCreated, AwaitingPayment | PaymentSucceeded | SubmissionFailed)
                | (
                    AwaitingPayment,
                    PaymentSucceeded | PaymentFailed | PaymentCancelled | SubmissionFailed
                )
                | (SubmissionFailed | PaymentFailed | PaymentCancelled, Editing)
        )
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Record of a single state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    /// The state being transitioned from
    pub from: CheckoutState,
    /// The state being transitioned to
    pub to: CheckoutState,
    /// When the transition occurred
    pub at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cod_path_is_allowed() {
        assert!(CheckoutState::Editing.can_transition_to(CheckoutState::Submitting));
        assert!(CheckoutState::Submitting.can_transition_to(CheckoutState::OrderCreated));
        assert!(CheckoutState::OrderCreated.can_transition_to(CheckoutState::PaymentSucceeded));
    }

    #[test]
    fn online_path_is_allowed() {
        assert!(CheckoutState::OrderCreated.can_transition_to(CheckoutState::AwaitingPayment));

        for end in [
            CheckoutState::PaymentSucceeded,
            CheckoutState::PaymentFailed,
            CheckoutState::PaymentCancelled,
        ] {
            assert!(CheckoutState::AwaitingPayment.can_transition_to(end), "{end} should be reachable");
        }
    }

    #[test]
    fn failed_submission_returns_to_editing() {
        assert!(CheckoutState::Submitting.can_transition_to(CheckoutState::SubmissionFailed));
        assert!(CheckoutState::OrderCreated.can_transition_to(CheckoutState::SubmissionFailed));
        assert!(CheckoutState::AwaitingPayment.can_transition_to(CheckoutState::SubmissionFailed));
        assert!(CheckoutState::SubmissionFailed.can_transition_to(CheckoutState::Editing));
    }

    #[test]
    fn success_is_a_dead_end() {
        for next in [
            CheckoutState::Editing,
            CheckoutState::Submitting,
            CheckoutState::PaymentFailed,
        ] {
            assert!(!CheckoutState::PaymentSucceeded.can_transition_to(next), "{next} should be unreachable");
        }
    }

    #[test]
    fn editing_cannot_skip_submission() {
        assert!(!CheckoutState::Editing.can_transition_to(CheckoutState::OrderCreated));
        assert!(!CheckoutState::Editing.can_transition_to(CheckoutState::PaymentSucceeded));
    }

    #[test]
    fn in_progress_states() {
        assert!(CheckoutState::Submitting.is_in_progress());
        assert!(CheckoutState::AwaitingPayment.is_in_progress());
        assert!(!CheckoutState::Editing.is_in_progress());
        assert!(!CheckoutState::PaymentFailed.is_in_progress());
    }

    #[test]
    fn error_and_final_flags() {
        assert!(CheckoutState::PaymentCancelled.is_final());
        assert!(CheckoutState::PaymentCancelled.is_error());
        assert!(CheckoutState::SubmissionFailed.is_error());
        assert!(!CheckoutState::SubmissionFailed.is_final());
        assert!(!CheckoutState::PaymentSucceeded.is_error());
    }
}
