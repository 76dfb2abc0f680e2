use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;

use crate::api::dtos::requests::{AvailabilityQuery, RangeAvailabilityRequest};
use crate::api::dtos::responses::{
    AvailabilityResponse, DayAvailabilitySummary, RangeAvailabilityResponse,
};
use crate::domain::models::appointment::Appointment;
use crate::domain::models::schedule::ScheduleConfig;
use crate::domain::models::service::ServiceDefinition;
use crate::domain::services::availability::{compute_day_slots, local_day_bounds_utc, Slot};
use crate::error::AppError;
use crate::state::AppState;

const MAX_RANGE_DAYS: i64 = 92;

async fn load_context(
    state: &AppState,
    contractor_id: &str,
    service_id: &str,
) -> Result<(ScheduleConfig, ServiceDefinition), AppError> {
    let config = state
        .schedule_repo
        .find_by_contractor(contractor_id)
        .await?
        .ok_or(AppError::NotFound("Schedule config not found".into()))?;
    let service = state
        .service_repo
        .find_by_id(contractor_id, service_id)
        .await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    if !service.active {
        return Err(AppError::Validation("Service is not active".into()));
    }
    Ok((config, service))
}

/// Ledger snapshot covering the date range, widened by a day on each side so
/// buffered neighbours across midnight still count.
async fn load_overlapping(
    state: &AppState,
    config: &ScheduleConfig,
    contractor_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<Appointment>, AppError> {
    let tz = config.tz()?;
    let (day_start, _) = local_day_bounds_utc(tz, start_date)?;
    let (_, day_end) = local_day_bounds_utc(tz, end_date)?;
    state
        .appointment_repo
        .list_active_overlapping(
            contractor_id,
            day_start - Duration::days(1),
            day_end + Duration::days(1),
        )
        .await
}

pub async fn get_day_availability(
    State(state): State<Arc<AppState>>,
    Path(contractor_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (config, service) = load_context(&state, &contractor_id, &query.service_id).await?;
    let existing =
        load_overlapping(&state, &config, &contractor_id, query.date, query.date).await?;

    let slots = compute_day_slots(&config, &service, &existing, query.date, Utc::now())?;
    Ok(Json(AvailabilityResponse {
        date: query.date,
        slots,
    }))
}

pub async fn get_range_availability(
    State(state): State<Arc<AppState>>,
    Path(contractor_id): Path<String>,
    Json(payload): Json<RangeAvailabilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.end_date < payload.start_date {
        return Err(AppError::Validation("Range end before range start".into()));
    }
    let span = (payload.end_date - payload.start_date).num_days();
    if span > MAX_RANGE_DAYS {
        return Err(AppError::Validation(format!(
            "Range must not exceed {} days",
            MAX_RANGE_DAYS
        )));
    }

    let (config, service) = load_context(&state, &contractor_id, &payload.service_id).await?;
    let existing = load_overlapping(
        &state,
        &config,
        &contractor_id,
        payload.start_date,
        payload.end_date,
    )
    .await?;

    let now = Utc::now();
    let mut days = Vec::new();
    let mut date = payload.start_date;
    while date <= payload.end_date {
        let slots: Vec<Slot> = compute_day_slots(&config, &service, &existing, date, now)?;
        days.push(DayAvailabilitySummary {
            date,
            open_slots: slots.iter().filter(|s| s.available).count(),
            total_slots: slots.len(),
        });
        date = match date.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }

    Ok(Json(RangeAvailabilityResponse { days }))
}
