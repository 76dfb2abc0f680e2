use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::models::service::ServiceDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Requested,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Requested => "REQUESTED",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "REQUESTED" => Some(AppointmentStatus::Requested),
            "CONFIRMED" => Some(AppointmentStatus::Confirmed),
            "CANCELLED" => Some(AppointmentStatus::Cancelled),
            "COMPLETED" => Some(AppointmentStatus::Completed),
            "NO_SHOW" => Some(AppointmentStatus::NoShow),
            _ => None,
        }
    }

    /// Active appointments hold their slot and participate in overlap checks.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Requested | AppointmentStatus::Confirmed)
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        match (self, next) {
            (AppointmentStatus::Requested, AppointmentStatus::Confirmed) => true,
            (AppointmentStatus::Requested, AppointmentStatus::Cancelled) => true,
            (AppointmentStatus::Requested, AppointmentStatus::Completed) => true,
            (AppointmentStatus::Confirmed, AppointmentStatus::Cancelled) => true,
            (AppointmentStatus::Confirmed, AppointmentStatus::Completed) => true,
            (AppointmentStatus::Confirmed, AppointmentStatus::NoShow) => true,
            _ => false,
        }
    }
}

/// Payment status values recorded on an appointment. Money movement itself is
/// owned by the external payment collaborator.
pub mod payment_status {
    pub const NONE: &str = "NONE";
    pub const DEPOSIT_PENDING: &str = "DEPOSIT_PENDING";
    pub const DEPOSIT_PAID: &str = "DEPOSIT_PAID";
    pub const REFUND_DUE: &str = "REFUND_DUE";
}

/// One booked appointment. Rows are never deleted; cancellation and the other
/// terminal outcomes are status transitions so the history stays available
/// for analytics and dispute resolution.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Appointment {
    pub id: String,
    pub contractor_id: String,
    pub client_id: Option<String>,
    pub service_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub price_cents: i64,
    pub deposit_required: bool,
    pub deposit_cents: i64,
    pub deposit_paid: bool,
    pub payment_status: String,
    pub payment_ref: Option<String>,
    pub refund_cents: Option<i64>,
    pub refund_reason: Option<String>,
    pub client_name: String,
    pub client_email: String,
    pub client_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

pub struct NewAppointmentParams<'a> {
    pub contractor_id: String,
    pub client_id: Option<String>,
    pub service: &'a ServiceDefinition,
    pub start: DateTime<Utc>,
    pub auto_confirm: bool,
    pub deposit_required: bool,
    pub deposit_cents: i64,
    pub client_name: String,
    pub client_email: String,
    pub client_note: Option<String>,
}

impl Appointment {
    pub fn new(params: NewAppointmentParams<'_>) -> Self {
        // end = start + prep + duration + cleanup, frozen at creation time.
        let end_time = params.start + Duration::minutes(params.service.block_minutes());

        let status = if params.auto_confirm {
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Requested
        };

        let pay_status = if params.deposit_required {
            payment_status::DEPOSIT_PENDING
        } else {
            payment_status::NONE
        };

        Self {
            id: Uuid::new_v4().to_string(),
            contractor_id: params.contractor_id,
            client_id: params.client_id,
            service_id: params.service.id.clone(),
            start_time: params.start,
            end_time,
            status: status.as_str().to_string(),
            price_cents: params.service.price_cents,
            deposit_required: params.deposit_required,
            deposit_cents: params.deposit_cents,
            deposit_paid: false,
            payment_status: pay_status.to_string(),
            payment_ref: None,
            refund_cents: None,
            refund_reason: None,
            client_name: params.client_name,
            client_email: params.client_email,
            client_note: params.client_note,
            created_at: Utc::now(),
            cancelled_at: None,
        }
    }

    /// Amount the client has actually paid so far; refunds are computed
    /// against this, never against the list price.
    pub fn amount_paid_cents(&self) -> i64 {
        if self.deposit_paid {
            self.deposit_cents
        } else {
            0
        }
    }
}
