use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

/// Working-hours window for one weekday of the template.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct DayHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub enabled: bool,
}

impl Default for DayHours {
    fn default() -> Self {
        Self {
            start: NaiveTime::MIN,
            end: NaiveTime::MIN,
            enabled: false,
        }
    }
}

/// Seven windows indexed Monday = 0 through Sunday = 6.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(transparent)]
pub struct WeekHours(pub [DayHours; 7]);

impl Default for WeekHours {
    fn default() -> Self {
        Self([DayHours::default(); 7])
    }
}

impl WeekHours {
    /// `weekday` is 0 = Monday .. 6 = Sunday.
    pub fn day(&self, weekday: u32) -> DayHours {
        self.0[(weekday as usize) % 7]
    }
}

/// Weekly-recurring unavailable window, e.g. a Tuesday lunch block.
/// `weekday` is 0 = Monday .. 6 = Sunday.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RecurringBlock {
    pub weekday: u8,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RefundMode {
    Full,
    Partial { percent: u8 },
    None,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CancellationPolicy {
    pub allow_cancellation: bool,
    /// Lead time before the appointment start under which a cancellation
    /// counts as late.
    pub deadline_hours: i64,
    pub refund_mode: RefundMode,
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self {
            allow_cancellation: true,
            deadline_hours: 24,
            refund_mode: RefundMode::Full,
        }
    }
}

/// One row per contractor. The weekday template, blackout dates, recurring
/// blocks and cancellation policy are stored as JSON columns; booking
/// activity never mutates this row.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleConfig {
    pub contractor_id: String,
    pub timezone: String,
    pub hours_json: String,
    pub blackout_json: String,
    pub recurring_json: String,
    pub buffer_min: i32,
    pub slot_interval_min: i32,
    pub advance_booking_days: i32,
    pub min_notice_min: i32,
    pub accepting_bookings: bool,
    pub auto_confirm: bool,
    pub requires_deposit: bool,
    pub deposit_percent: i32,
    pub cancellation_json: String,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleConfig {
    pub fn tz(&self) -> Result<Tz, AppError> {
        self.timezone
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid timezone: {}", self.timezone)))
    }

    pub fn hours(&self) -> WeekHours {
        serde_json::from_str(&self.hours_json).unwrap_or_default()
    }

    pub fn blackout_dates(&self) -> Vec<NaiveDate> {
        serde_json::from_str(&self.blackout_json).unwrap_or_default()
    }

    pub fn recurring_blocks(&self) -> Vec<RecurringBlock> {
        serde_json::from_str(&self.recurring_json).unwrap_or_default()
    }

    pub fn cancellation(&self) -> CancellationPolicy {
        serde_json::from_str(&self.cancellation_json).unwrap_or_default()
    }
}
