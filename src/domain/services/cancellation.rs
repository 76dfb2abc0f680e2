use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::models::appointment::Appointment;
use crate::domain::models::schedule::{CancellationPolicy, RefundMode};

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RefundReason {
    PolicyForbids,
    BeforeDeadline,
    LateFullRefund,
    LatePartialRefund,
    LateNoRefund,
}

impl RefundReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundReason::PolicyForbids => "policy_forbids",
            RefundReason::BeforeDeadline => "before_deadline",
            RefundReason::LateFullRefund => "late_full_refund",
            RefundReason::LatePartialRefund => "late_partial_refund",
            RefundReason::LateNoRefund => "late_no_refund",
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct CancellationOutcome {
    pub allowed: bool,
    pub refund_cents: i64,
    pub reason: RefundReason,
}

/// Pure refund decision; the ledger applies it. Cancelling at exactly
/// `start - deadline` still lands in the full-refund branch; one second past
/// the deadline counts as late. Refunds are computed against the amount the
/// client actually paid and clamped to `[0, paid]`.
pub fn resolve_cancellation(
    appointment: &Appointment,
    policy: &CancellationPolicy,
    now: DateTime<Utc>,
) -> CancellationOutcome {
    if !policy.allow_cancellation {
        return CancellationOutcome {
            allowed: false,
            refund_cents: 0,
            reason: RefundReason::PolicyForbids,
        };
    }

    let paid = appointment.amount_paid_cents();
    let lead = appointment.start_time - now;

    if lead >= Duration::hours(policy.deadline_hours) {
        return CancellationOutcome {
            allowed: true,
            refund_cents: paid,
            reason: RefundReason::BeforeDeadline,
        };
    }

    let (refund, reason) = match policy.refund_mode {
        RefundMode::Full => (paid, RefundReason::LateFullRefund),
        RefundMode::Partial { percent } => (
            paid * (percent.min(100) as i64) / 100,
            RefundReason::LatePartialRefund,
        ),
        RefundMode::None => (0, RefundReason::LateNoRefund),
    };

    CancellationOutcome {
        allowed: true,
        refund_cents: refund.clamp(0, paid),
        reason,
    }
}
