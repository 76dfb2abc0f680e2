use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::models::appointment::Appointment;
use crate::domain::models::schedule::{CancellationPolicy, RecurringBlock, ScheduleConfig, WeekHours};
use crate::domain::services::availability::Slot;

/// Schedule config with the JSON columns expanded for API consumers.
#[derive(Serialize)]
pub struct ScheduleConfigResponse {
    pub contractor_id: String,
    pub timezone: String,
    pub hours: WeekHours,
    pub blackout_dates: Vec<NaiveDate>,
    pub recurring_blocks: Vec<RecurringBlock>,
    pub buffer_min: i32,
    pub slot_interval_min: i32,
    pub advance_booking_days: i32,
    pub min_notice_min: i32,
    pub accepting_bookings: bool,
    pub auto_confirm: bool,
    pub requires_deposit: bool,
    pub deposit_percent: i32,
    pub cancellation: CancellationPolicy,
}

impl From<&ScheduleConfig> for ScheduleConfigResponse {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            contractor_id: config.contractor_id.clone(),
            timezone: config.timezone.clone(),
            hours: config.hours(),
            blackout_dates: config.blackout_dates(),
            recurring_blocks: config.recurring_blocks(),
            buffer_min: config.buffer_min,
            slot_interval_min: config.slot_interval_min,
            advance_booking_days: config.advance_booking_days,
            min_notice_min: config.min_notice_min,
            accepting_bookings: config.accepting_bookings,
            auto_confirm: config.auto_confirm,
            requires_deposit: config.requires_deposit,
            deposit_percent: config.deposit_percent,
            cancellation: config.cancellation(),
        }
    }
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

#[derive(Serialize)]
pub struct DayAvailabilitySummary {
    pub date: NaiveDate,
    pub open_slots: usize,
    pub total_slots: usize,
}

#[derive(Serialize)]
pub struct RangeAvailabilityResponse {
    pub days: Vec<DayAvailabilitySummary>,
}

#[derive(Serialize)]
pub struct CancellationResponse {
    pub appointment: Appointment,
    pub refund_cents: i64,
    pub refund_reason: String,
}
