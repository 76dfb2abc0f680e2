use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::domain::models::appointment::{Appointment, AppointmentStatus};
use crate::domain::models::schedule::ScheduleConfig;
use crate::domain::models::service::ServiceDefinition;
use crate::error::AppError;

const MINUTES_PER_DAY: u32 = 1440;

/// Ephemeral calculator output; never persisted.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SlotBlocker>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotBlocker {
    /// Effective busy interval of an existing appointment intersects.
    Booked,
    /// Start violates the minimum-notice lead time.
    Notice,
}

/// An appointment's scheduled span expanded by the buffer on both sides.
/// Every overlap decision in the engine goes through this expansion.
pub fn busy_interval(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    buffer_min: i32,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let buffer = Duration::minutes(buffer_min as i64);
    (start - buffer, end + buffer)
}

/// Half-open overlap: touching endpoints do not conflict.
pub fn intervals_overlap(a: (DateTime<Utc>, DateTime<Utc>), b: (DateTime<Utc>, DateTime<Utc>)) -> bool {
    a.0 < b.1 && a.1 > b.0
}

fn minute_index(t: NaiveTime) -> u32 {
    let idx = t.hour() * 60 + t.minute();
    // A window ending at 23:59 means "until end of day".
    if idx == MINUTES_PER_DAY - 1 {
        MINUTES_PER_DAY
    } else {
        idx
    }
}

/// UTC bounds of a local calendar day in the contractor's timezone.
pub fn local_day_bounds_utc(tz: Tz, date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let start = tz
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or_else(|| AppError::Validation(format!("Day {} has no valid midnight in {}", date, tz)))?;
    let next = date
        .succ_opt()
        .ok_or_else(|| AppError::Validation("Date out of range".into()))?;
    let end = tz
        .from_local_datetime(&next.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or_else(|| AppError::Validation(format!("Day {} has no valid midnight in {}", next, tz)))?;
    Ok((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

/// Working-hours windows for one day as minute-of-day ranges: the weekday
/// template minus every recurring block matching that weekday. Blackout dates
/// and disabled weekdays yield no windows.
fn day_windows(config: &ScheduleConfig, date: NaiveDate) -> Vec<(u32, u32)> {
    if config.blackout_dates().contains(&date) {
        return Vec::new();
    }

    let weekday = date.weekday().num_days_from_monday();
    let day = config.hours().day(weekday);
    if !day.enabled || day.end <= day.start {
        return Vec::new();
    }

    let mut windows = vec![(minute_index(day.start), minute_index(day.end))];
    for block in config.recurring_blocks() {
        if block.weekday as u32 != weekday {
            continue;
        }
        let (bs, be) = (minute_index(block.start), minute_index(block.end));
        if be <= bs {
            continue;
        }
        let mut next = Vec::new();
        for (ws, we) in windows {
            if be <= ws || bs >= we {
                next.push((ws, we));
                continue;
            }
            if bs > ws {
                next.push((ws, bs));
            }
            if be < we {
                next.push((be, we));
            }
        }
        windows = next;
    }
    windows
}

fn is_bookable_day(config: &ScheduleConfig, tz: Tz, date: NaiveDate, now: DateTime<Utc>) -> bool {
    let today = now.with_timezone(&tz).date_naive();
    let horizon_end = today + Duration::days(config.advance_booking_days as i64);
    date >= today && date <= horizon_end
}

/// Candidate slots for one local calendar day. Pure over its inputs; callers
/// pass the ledger snapshot of REQUESTED/CONFIRMED appointments overlapping
/// the day (widened by the buffer, including midnight-spanning neighbours).
pub fn compute_day_slots(
    config: &ScheduleConfig,
    service: &ServiceDefinition,
    existing: &[Appointment],
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<Slot>, AppError> {
    let tz = config.tz()?;

    if !is_bookable_day(config, tz, date, now) {
        return Ok(Vec::new());
    }

    let block_min = service.block_minutes();
    let interval = config.slot_interval_min.max(1) as i64;
    if block_min <= 0 {
        return Ok(Vec::new());
    }

    let busy: Vec<(DateTime<Utc>, DateTime<Utc>)> = existing
        .iter()
        .filter(|a| {
            AppointmentStatus::parse(&a.status)
                .map(|s| s.is_active())
                .unwrap_or(false)
        })
        .map(|a| busy_interval(a.start_time, a.end_time, config.buffer_min))
        .collect();

    let notice_cutoff = now + Duration::minutes(config.min_notice_min as i64);

    let mut slots = Vec::new();
    for (win_start, win_end) in day_windows(config, date) {
        let mut cursor = win_start as i64;
        while cursor + block_min <= win_end as i64 {
            let minute = cursor;
            cursor += interval;

            let time = match NaiveTime::from_hms_opt((minute / 60) as u32, (minute % 60) as u32, 0) {
                Some(t) => t,
                None => continue,
            };
            // Ambiguous or nonexistent local times (DST transitions) are not
            // offered as candidates.
            let start = match tz.from_local_datetime(&date.and_time(time)) {
                chrono::LocalResult::Single(dt) => dt.with_timezone(&Utc),
                _ => continue,
            };
            let end = start + Duration::minutes(block_min);

            let candidate_busy = busy_interval(start, end, config.buffer_min);
            let reason = if busy.iter().any(|b| intervals_overlap(candidate_busy, *b)) {
                Some(SlotBlocker::Booked)
            } else if start < notice_cutoff {
                Some(SlotBlocker::Notice)
            } else {
                None
            };

            slots.push(Slot {
                start,
                end,
                available: reason.is_none(),
                reason,
            });
        }
    }

    Ok(slots)
}

/// Ordered bookable slots for every day in `[range_start, range_end]`.
/// Deterministic: identical inputs (including `now`) yield identical output.
pub fn compute_availability(
    config: &ScheduleConfig,
    service: &ServiceDefinition,
    existing: &[Appointment],
    range_start: NaiveDate,
    range_end: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<Slot>, AppError> {
    if range_end < range_start {
        return Err(AppError::Validation("Range end before range start".into()));
    }

    let mut slots = Vec::new();
    let mut date = range_start;
    while date <= range_end {
        slots.extend(compute_day_slots(config, service, existing, date, now)?);
        date = match date.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }
    Ok(slots)
}

/// Pre-commit validation of a requested start against everything except the
/// ledger conflict check, which only the atomic insert can decide.
pub fn validate_booking_start(
    config: &ScheduleConfig,
    service: &ServiceDefinition,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let tz = config.tz()?;
    let local = start.with_timezone(&tz);
    let date = local.date_naive();
    let today = now.with_timezone(&tz).date_naive();

    if start < now {
        return Err(AppError::Validation("Cannot book in the past".into()));
    }

    let horizon_end = today + Duration::days(config.advance_booking_days as i64);
    if date > horizon_end {
        return Err(AppError::HorizonViolation(format!(
            "Bookings are only accepted up to {} days ahead (until {})",
            config.advance_booking_days, horizon_end
        )));
    }

    if start < now + Duration::minutes(config.min_notice_min as i64) {
        return Err(AppError::NoticeViolation(format!(
            "Bookings require at least {} minutes notice",
            config.min_notice_min
        )));
    }

    if config.blackout_dates().contains(&date) {
        return Err(AppError::SlotUnavailable(format!("{} is a blackout date", date)));
    }

    let windows = day_windows(config, date);
    if windows.is_empty() {
        return Err(AppError::SlotUnavailable(format!("No working hours on {}", date)));
    }

    let start_idx = (local.time().hour() * 60 + local.time().minute()) as i64;
    let block = service.block_minutes();
    let fits = windows
        .iter()
        .any(|(ws, we)| start_idx >= *ws as i64 && start_idx + block <= *we as i64);
    if !fits {
        return Err(AppError::SlotUnavailable(
            "Requested time falls outside the working-hours template".into(),
        ));
    }

    Ok(())
}
