use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::UpsertScheduleRequest;
use crate::api::dtos::responses::ScheduleConfigResponse;
use crate::domain::models::schedule::{RefundMode, ScheduleConfig};
use crate::error::AppError;
use crate::state::AppState;

fn validate(payload: &UpsertScheduleRequest) -> Result<(), AppError> {
    if payload.timezone.parse::<Tz>().is_err() {
        return Err(AppError::Validation(format!("Invalid timezone: {}", payload.timezone)));
    }
    for (i, day) in payload.hours.0.iter().enumerate() {
        if day.enabled && day.end <= day.start {
            return Err(AppError::Validation(format!(
                "Working hours for weekday {} end before they start",
                i
            )));
        }
    }
    for block in &payload.recurring_blocks {
        if block.weekday > 6 {
            return Err(AppError::Validation("Recurring block weekday must be 0..=6".into()));
        }
        if block.end <= block.start {
            return Err(AppError::Validation("Recurring block ends before it starts".into()));
        }
    }
    if payload.slot_interval_min <= 0 {
        return Err(AppError::Validation("slot_interval_min must be positive".into()));
    }
    if payload.buffer_min < 0
        || payload.advance_booking_days < 0
        || payload.min_notice_min < 0
        || payload.cancellation.deadline_hours < 0
    {
        return Err(AppError::Validation("Durations must not be negative".into()));
    }
    if !(0..=100).contains(&payload.deposit_percent) {
        return Err(AppError::Validation("deposit_percent must be within 0..=100".into()));
    }
    if let RefundMode::Partial { percent } = payload.cancellation.refund_mode {
        if percent > 100 {
            return Err(AppError::Validation("Partial refund percent must be within 0..=100".into()));
        }
    }
    Ok(())
}

pub async fn upsert_schedule(
    State(state): State<Arc<AppState>>,
    Path(contractor_id): Path<String>,
    Json(payload): Json<UpsertScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate(&payload)?;

    let config = ScheduleConfig {
        contractor_id: contractor_id.clone(),
        timezone: payload.timezone,
        hours_json: serde_json::to_string(&payload.hours).map_err(|_| AppError::Internal)?,
        blackout_json: serde_json::to_string(&payload.blackout_dates).map_err(|_| AppError::Internal)?,
        recurring_json: serde_json::to_string(&payload.recurring_blocks).map_err(|_| AppError::Internal)?,
        buffer_min: payload.buffer_min,
        slot_interval_min: payload.slot_interval_min,
        advance_booking_days: payload.advance_booking_days,
        min_notice_min: payload.min_notice_min,
        accepting_bookings: payload.accepting_bookings,
        auto_confirm: payload.auto_confirm,
        requires_deposit: payload.requires_deposit,
        deposit_percent: payload.deposit_percent,
        cancellation_json: serde_json::to_string(&payload.cancellation).map_err(|_| AppError::Internal)?,
        updated_at: Utc::now(),
    };

    let saved = state.schedule_repo.upsert(&config).await?;
    info!("Schedule config updated for contractor {}", contractor_id);
    Ok(Json(ScheduleConfigResponse::from(&saved)))
}

pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(contractor_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let config = state
        .schedule_repo
        .find_by_contractor(&contractor_id)
        .await?
        .ok_or(AppError::NotFound("Schedule config not found".into()))?;
    Ok(Json(ScheduleConfigResponse::from(&config)))
}
