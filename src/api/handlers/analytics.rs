use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dtos::requests::AnalyticsQuery;
use crate::domain::services::analytics::summarize;
use crate::domain::services::availability::local_day_bounds_utc;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(contractor_id): Path<String>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, AppError> {
    if query.end_date < query.start_date {
        return Err(AppError::Validation("Range end before range start".into()));
    }

    let config = state
        .schedule_repo
        .find_by_contractor(&contractor_id)
        .await?
        .ok_or(AppError::NotFound("Schedule config not found".into()))?;
    let tz = config.tz()?;

    let (range_start, _) = local_day_bounds_utc(tz, query.start_date)?;
    let (_, range_end) = local_day_bounds_utc(tz, query.end_date)?;
    let appointments = state
        .appointment_repo
        .list_in_range(&contractor_id, range_start, range_end)
        .await?;

    let summary = summarize(&config, &appointments, query.start_date, query.end_date);
    Ok(Json(summary))
}
