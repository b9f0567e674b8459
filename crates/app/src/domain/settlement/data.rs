//! Settlement Data

use crate::{
    domain::{orders::data::OrderStatus, payments::data::PaymentStatus},
    gateway::CallbackOutcome,
};

/// Buyer-facing pages the callbacks redirect to; the payment id is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectUrls {
    pub success: String,
    pub cancel: String,
}

impl RedirectUrls {
    #[must_use]
    pub fn base(&self, outcome: CallbackOutcome) -> &str {
        match outcome {
            CallbackOutcome::Success => &self.success,
            CallbackOutcome::Cancel => &self.cancel,
        }
    }
}

/// Result of handling one gateway callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub redirect_url: String,

    /// `false` when the payment already carried this outcome and nothing changed.
    pub transitioned: bool,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
}

/// Payment and order statuses a callback outcome settles to.
#[must_use]
pub const fn settled_statuses(outcome: CallbackOutcome) -> (PaymentStatus, OrderStatus) {
    match outcome {
        CallbackOutcome::Success => (PaymentStatus::Paid, OrderStatus::Confirmed),
        CallbackOutcome::Cancel => (PaymentStatus::Cancelled, OrderStatus::Cancelled),
    }
}

/// What a callback may do to a payment in its current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Apply,
    AlreadyApplied,
    Rejected,
}

/// Only pending payments settle; replays of the same outcome are no-ops.
#[must_use]
pub fn transition(current: PaymentStatus, outcome: CallbackOutcome) -> Transition {
    let (target, _) = settled_statuses(outcome);

    if current == PaymentStatus::Pending {
        Transition::Apply
    } else if current == target {
        Transition::AlreadyApplied
    } else {
        Transition::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_payments_settle_either_way() {
        assert_eq!(
            transition(PaymentStatus::Pending, CallbackOutcome::Success),
            Transition::Apply
        );
        assert_eq!(
            transition(PaymentStatus::Pending, CallbackOutcome::Cancel),
            Transition::Apply
        );
    }

    #[test]
    fn replayed_outcome_is_a_no_op() {
        assert_eq!(
            transition(PaymentStatus::Paid, CallbackOutcome::Success),
            Transition::AlreadyApplied
        );
        assert_eq!(
            transition(PaymentStatus::Cancelled, CallbackOutcome::Cancel),
            Transition::AlreadyApplied
        );
    }

    #[test]
    fn settled_payments_cannot_flip() {
        assert_eq!(
            transition(PaymentStatus::Paid, CallbackOutcome::Cancel),
            Transition::Rejected
        );
        assert_eq!(
            transition(PaymentStatus::Cancelled, CallbackOutcome::Success),
            Transition::Rejected
        );
        assert_eq!(
            transition(PaymentStatus::Refunded, CallbackOutcome::Success),
            Transition::Rejected
        );
    }
}
