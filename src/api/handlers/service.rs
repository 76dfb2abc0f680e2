use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{CreateServiceRequest, UpdateServiceRequest};
use crate::domain::models::service::{NewServiceParams, ServiceDefinition};
use crate::error::AppError;
use crate::state::AppState;

fn validate_times(duration_min: i32, prep_min: i32, cleanup_min: i32) -> Result<(), AppError> {
    if duration_min <= 0 {
        return Err(AppError::Validation("duration_min must be positive".into()));
    }
    if prep_min < 0 || cleanup_min < 0 {
        return Err(AppError::Validation("prep_min and cleanup_min must not be negative".into()));
    }
    Ok(())
}

fn validate_pricing(price_cents: i64, deposit_override: Option<i32>) -> Result<(), AppError> {
    if price_cents < 0 {
        return Err(AppError::Validation("price_cents must not be negative".into()));
    }
    if let Some(pct) = deposit_override {
        if !(0..=100).contains(&pct) {
            return Err(AppError::Validation("deposit_percent_override must be within 0..=100".into()));
        }
    }
    Ok(())
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    Path(contractor_id): Path<String>,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_times(payload.duration_min, payload.prep_min, payload.cleanup_min)?;
    validate_pricing(payload.price_cents, payload.deposit_percent_override)?;

    let service = ServiceDefinition::new(NewServiceParams {
        contractor_id,
        name: payload.name,
        description: payload.description,
        duration_min: payload.duration_min,
        prep_min: payload.prep_min,
        cleanup_min: payload.cleanup_min,
        price_cents: payload.price_cents,
        deposit_percent_override: payload.deposit_percent_override,
        active: payload.active,
    });

    let created = state.service_repo.create(&service).await?;
    info!("Service created: {} ({})", created.id, created.name);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Path(contractor_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let services = state.service_repo.list(&contractor_id).await?;
    Ok(Json(services))
}

pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path((contractor_id, service_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let service = state
        .service_repo
        .find_by_id(&contractor_id, &service_id)
        .await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    Ok(Json(service))
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path((contractor_id, service_id)): Path<(String, String)>,
    Json(payload): Json<UpdateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut service = state
        .service_repo
        .find_by_id(&contractor_id, &service_id)
        .await?
        .ok_or(AppError::NotFound("Service not found".into()))?;

    // Time components are frozen once any appointment references the
    // service; already-booked appointments keep their computed span.
    let edits_times = payload.duration_min.is_some()
        || payload.prep_min.is_some()
        || payload.cleanup_min.is_some();
    if edits_times {
        let referenced = state.appointment_repo.count_for_service(&service_id).await?;
        if referenced > 0 {
            return Err(AppError::Validation(
                "Cannot change duration, prep or cleanup of a service with existing appointments".into(),
            ));
        }
    }

    if let Some(name) = payload.name {
        service.name = name;
    }
    if let Some(description) = payload.description {
        service.description = Some(description);
    }
    if let Some(duration) = payload.duration_min {
        service.duration_min = duration;
    }
    if let Some(prep) = payload.prep_min {
        service.prep_min = prep;
    }
    if let Some(cleanup) = payload.cleanup_min {
        service.cleanup_min = cleanup;
    }
    if let Some(price) = payload.price_cents {
        service.price_cents = price;
    }
    if let Some(pct) = payload.deposit_percent_override {
        service.deposit_percent_override = Some(pct);
    }
    if let Some(active) = payload.active {
        service.active = active;
    }

    validate_times(service.duration_min, service.prep_min, service.cleanup_min)?;
    validate_pricing(service.price_cents, service.deposit_percent_override)?;

    let updated = state.service_repo.update(&service).await?;
    info!("Service updated: {}", updated.id);
    Ok(Json(updated))
}
