use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::models::appointment::{Appointment, AppointmentStatus};
use crate::domain::models::schedule::ScheduleConfig;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ScheduleSummary {
    pub total_appointments: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub no_show: i64,
    pub booked_minutes: i64,
    pub workable_minutes: i64,
    pub utilization: f64,
}

impl ScheduleSummary {
    fn zero() -> Self {
        Self {
            total_appointments: 0,
            completed: 0,
            cancelled: 0,
            no_show: 0,
            booked_minutes: 0,
            workable_minutes: 0,
            utilization: 0.0,
        }
    }
}

/// Read-only rollup over appointments already fetched for the range.
/// Utilization is booked block minutes of CONFIRMED/COMPLETED appointments
/// over the enabled working-hours minutes of the range; blackout days drop
/// out of the denominator. An empty denominator yields zeros.
pub fn summarize(
    config: &ScheduleConfig,
    appointments: &[Appointment],
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> ScheduleSummary {
    if range_end < range_start {
        return ScheduleSummary::zero();
    }

    let mut summary = ScheduleSummary::zero();

    for appt in appointments {
        summary.total_appointments += 1;
        match AppointmentStatus::parse(&appt.status) {
            Some(AppointmentStatus::Completed) => summary.completed += 1,
            Some(AppointmentStatus::Cancelled) => summary.cancelled += 1,
            Some(AppointmentStatus::NoShow) => summary.no_show += 1,
            _ => {}
        }
        let counts = matches!(
            AppointmentStatus::parse(&appt.status),
            Some(AppointmentStatus::Confirmed) | Some(AppointmentStatus::Completed)
        );
        if counts {
            summary.booked_minutes += (appt.end_time - appt.start_time).num_minutes();
        }
    }

    let hours = config.hours();
    let blackouts = config.blackout_dates();
    let mut date = range_start;
    while date <= range_end {
        if !blackouts.contains(&date) {
            let day = hours.day(date.weekday().num_days_from_monday());
            if day.enabled && day.end > day.start {
                summary.workable_minutes += (day.end - day.start).num_minutes();
            }
        }
        date = match date.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }

    if summary.workable_minutes > 0 {
        summary.utilization = summary.booked_minutes as f64 / summary.workable_minutes as f64;
    }

    summary
}
