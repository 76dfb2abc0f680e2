use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::domain::models::schedule::{CancellationPolicy, RecurringBlock, WeekHours};

fn default_true() -> bool {
    true
}

fn default_slot_interval() -> i32 {
    15
}

fn default_horizon_days() -> i32 {
    30
}

#[derive(Deserialize)]
pub struct UpsertScheduleRequest {
    pub timezone: String,
    pub hours: WeekHours,
    #[serde(default)]
    pub blackout_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub recurring_blocks: Vec<RecurringBlock>,
    #[serde(default)]
    pub buffer_min: i32,
    #[serde(default = "default_slot_interval")]
    pub slot_interval_min: i32,
    #[serde(default = "default_horizon_days")]
    pub advance_booking_days: i32,
    #[serde(default)]
    pub min_notice_min: i32,
    #[serde(default = "default_true")]
    pub accepting_bookings: bool,
    #[serde(default)]
    pub auto_confirm: bool,
    #[serde(default)]
    pub requires_deposit: bool,
    #[serde(default)]
    pub deposit_percent: i32,
    #[serde(default)]
    pub cancellation: CancellationPolicy,
}

#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i32,
    #[serde(default)]
    pub prep_min: i32,
    #[serde(default)]
    pub cleanup_min: i32,
    pub price_cents: i64,
    pub deposit_percent_override: Option<i32>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_min: Option<i32>,
    pub prep_min: Option<i32>,
    pub cleanup_min: Option<i32>,
    pub price_cents: Option<i64>,
    pub deposit_percent_override: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
    pub note: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub service_id: String,
    pub start: DateTime<Utc>,
    pub client: ClientInfo,
}

#[derive(Deserialize)]
pub struct AppointmentActionRequest {
    pub action: String,
}

#[derive(Deserialize)]
pub struct DepositCallbackRequest {
    pub paid: bool,
    pub payment_ref: Option<String>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub service_id: String,
    pub date: NaiveDate,
}

#[derive(Deserialize)]
pub struct RangeAvailabilityRequest {
    pub service_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct AppointmentListQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct AnalyticsQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
