use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::dtos::requests::{
    AppointmentActionRequest, AppointmentListQuery, CreateAppointmentRequest,
    DepositCallbackRequest,
};
use crate::api::dtos::responses::CancellationResponse;
use crate::domain::models::appointment::{
    payment_status, Appointment, AppointmentStatus, NewAppointmentParams,
};
use crate::domain::services::availability::{local_day_bounds_utc, validate_booking_start};
use crate::domain::services::cancellation::resolve_cancellation;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Path(contractor_id): Path<String>,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = state
        .schedule_repo
        .find_by_contractor(&contractor_id)
        .await?
        .ok_or(AppError::NotFound("Schedule config not found".into()))?;

    if !config.accepting_bookings {
        return Err(AppError::PolicyViolation(
            "Contractor is not accepting bookings".into(),
        ));
    }

    let service = state
        .service_repo
        .find_by_id(&contractor_id, &payload.service_id)
        .await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    if !service.active {
        return Err(AppError::Validation("Service is not active".into()));
    }

    let now = Utc::now();
    validate_booking_start(&config, &service, payload.start, now)?;

    let deposit_pct = service
        .deposit_percent_override
        .unwrap_or(config.deposit_percent);
    let deposit_required =
        (config.requires_deposit || service.deposit_percent_override.is_some()) && deposit_pct > 0;
    let deposit_cents = if deposit_required {
        service.price_cents * deposit_pct as i64 / 100
    } else {
        0
    };

    let appointment = Appointment::new(NewAppointmentParams {
        contractor_id: contractor_id.clone(),
        client_id: payload.client.client_id,
        service: &service,
        start: payload.start,
        auto_confirm: config.auto_confirm,
        deposit_required,
        deposit_cents,
        client_name: payload.client.name,
        client_email: payload.client.email,
        client_note: payload.client.note,
    });

    // Two busy intervals (each padded by the buffer on both sides) intersect
    // exactly when the raw spans come within 2 * buffer of each other, so the
    // ledger check widens the candidate span by twice the buffer.
    let pad = Duration::minutes(2 * config.buffer_min.max(0) as i64);
    let mut created = state
        .appointment_repo
        .create_if_free(
            &appointment,
            appointment.start_time - pad,
            appointment.end_time + pad,
        )
        .await?;

    info!(
        "Appointment {} booked for contractor {} at {}",
        created.id, contractor_id, created.start_time
    );

    if created.deposit_required {
        match state
            .payment_gateway
            .create_deposit_intent(&contractor_id, &created.id, created.deposit_cents)
            .await
        {
            Ok(reference) => {
                created = state
                    .appointment_repo
                    .set_deposit(
                        &contractor_id,
                        &created.id,
                        false,
                        Some(reference),
                        payment_status::DEPOSIT_PENDING,
                    )
                    .await?;
            }
            // The slot is held either way; payment can be retried through the
            // deposit callback.
            Err(e) => warn!("Deposit intent for appointment {} failed: {}", created.id, e),
        }
    }

    if let Err(e) = state.notifier.appointment_booked(&created).await {
        warn!("Booking notification for {} failed: {}", created.id, e);
    }

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Path(contractor_id): Path<String>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let appointments = match (query.from, query.to) {
        (Some(from), Some(to)) => {
            if to < from {
                return Err(AppError::Validation("Range end before range start".into()));
            }
            let config = state
                .schedule_repo
                .find_by_contractor(&contractor_id)
                .await?
                .ok_or(AppError::NotFound("Schedule config not found".into()))?;
            let tz = config.tz()?;
            let (start, _) = local_day_bounds_utc(tz, from)?;
            let (_, end) = local_day_bounds_utc(tz, to)?;
            state
                .appointment_repo
                .list_in_range(&contractor_id, start, end)
                .await?
        }
        (None, None) => state.appointment_repo.list_by_contractor(&contractor_id).await?,
        _ => {
            return Err(AppError::Validation(
                "from and to must be provided together".into(),
            ))
        }
    };
    Ok(Json(appointments))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path((contractor_id, appointment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state
        .appointment_repo
        .find_by_id(&contractor_id, &appointment_id)
        .await?
        .ok_or(AppError::NotFound("Appointment not found".into()))?;
    Ok(Json(appointment))
}

pub async fn appointment_action(
    State(state): State<Arc<AppState>>,
    Path((contractor_id, appointment_id)): Path<(String, String)>,
    Json(payload): Json<AppointmentActionRequest>,
) -> Result<axum::response::Response, AppError> {
    let appointment = state
        .appointment_repo
        .find_by_id(&contractor_id, &appointment_id)
        .await?
        .ok_or(AppError::NotFound("Appointment not found".into()))?;

    let current = AppointmentStatus::parse(&appointment.status).ok_or_else(|| {
        AppError::InternalWithMsg(format!(
            "Appointment {} has unknown status {}",
            appointment.id, appointment.status
        ))
    })?;

    match payload.action.as_str() {
        "cancel" => cancel_appointment(state, appointment, current).await,
        "confirm" => {
            transition(state, appointment, current, AppointmentStatus::Confirmed).await
        }
        "complete" => {
            transition(state, appointment, current, AppointmentStatus::Completed).await
        }
        "no_show" => transition(state, appointment, current, AppointmentStatus::NoShow).await,
        other => Err(AppError::Validation(format!("Unknown action: {}", other))),
    }
}

async fn transition(
    state: Arc<AppState>,
    appointment: Appointment,
    current: AppointmentStatus,
    next: AppointmentStatus,
) -> Result<axum::response::Response, AppError> {
    if !current.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "Cannot move appointment from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    let updated = state
        .appointment_repo
        .set_status(
            &appointment.contractor_id,
            &appointment.id,
            current.as_str(),
            next.as_str(),
        )
        .await?;

    info!(
        "Appointment {} moved {} -> {}",
        updated.id,
        current.as_str(),
        next.as_str()
    );
    Ok(Json(updated).into_response())
}

async fn cancel_appointment(
    state: Arc<AppState>,
    appointment: Appointment,
    current: AppointmentStatus,
) -> Result<axum::response::Response, AppError> {
    if !current.can_transition_to(AppointmentStatus::Cancelled) {
        return Err(AppError::Conflict(format!(
            "Cannot cancel an appointment in status {}",
            current.as_str()
        )));
    }

    let config = state
        .schedule_repo
        .find_by_contractor(&appointment.contractor_id)
        .await?
        .ok_or(AppError::NotFound("Schedule config not found".into()))?;
    let policy = config.cancellation();

    let outcome = resolve_cancellation(&appointment, &policy, Utc::now());
    if !outcome.allowed {
        return Err(AppError::PolicyViolation(
            "Cancellation is not allowed by the contractor's policy".into(),
        ));
    }

    let next_payment_status = if outcome.refund_cents > 0 && appointment.deposit_paid {
        payment_status::REFUND_DUE
    } else {
        appointment.payment_status.as_str()
    };

    let cancelled = state
        .appointment_repo
        .cancel(
            &appointment.contractor_id,
            &appointment.id,
            outcome.refund_cents,
            outcome.reason.as_str(),
            next_payment_status,
            Utc::now(),
        )
        .await?;

    info!(
        "Appointment {} cancelled, refund {} cents ({})",
        cancelled.id,
        outcome.refund_cents,
        outcome.reason.as_str()
    );

    if let Err(e) = state
        .notifier
        .appointment_cancelled(&cancelled, outcome.refund_cents)
        .await
    {
        warn!("Cancellation notification for {} failed: {}", cancelled.id, e);
    }

    Ok(Json(CancellationResponse {
        appointment: cancelled,
        refund_cents: outcome.refund_cents,
        refund_reason: outcome.reason.as_str().to_string(),
    })
    .into_response())
}

pub async fn deposit_callback(
    State(state): State<Arc<AppState>>,
    Path((contractor_id, appointment_id)): Path<(String, String)>,
    Json(payload): Json<DepositCallbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state
        .appointment_repo
        .find_by_id(&contractor_id, &appointment_id)
        .await?
        .ok_or(AppError::NotFound("Appointment not found".into()))?;

    if !appointment.deposit_required {
        return Err(AppError::Validation(
            "Appointment does not require a deposit".into(),
        ));
    }

    let status = if payload.paid {
        payment_status::DEPOSIT_PAID
    } else {
        payment_status::DEPOSIT_PENDING
    };

    let updated = state
        .appointment_repo
        .set_deposit(
            &contractor_id,
            &appointment_id,
            payload.paid,
            payload.payment_ref,
            status,
        )
        .await?;

    info!(
        "Deposit for appointment {} marked {}",
        updated.id,
        if payload.paid { "paid" } else { "pending" }
    );
    Ok(Json(updated))
}
