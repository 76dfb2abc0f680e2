use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{analytics, appointment, availability, health, schedule, service};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Schedule config
        .route("/api/v1/{contractor_id}/schedule", put(schedule::upsert_schedule).get(schedule::get_schedule))

        // Services
        .route("/api/v1/{contractor_id}/services", post(service::create_service).get(service::list_services))
        .route("/api/v1/{contractor_id}/services/{service_id}", get(service::get_service).put(service::update_service))

        // Availability
        .route("/api/v1/{contractor_id}/availability", get(availability::get_day_availability).post(availability::get_range_availability))

        // Appointments
        .route("/api/v1/{contractor_id}/appointments", post(appointment::create_appointment).get(appointment::list_appointments))
        .route("/api/v1/{contractor_id}/appointments/{appointment_id}", get(appointment::get_appointment).patch(appointment::appointment_action))
        .route("/api/v1/{contractor_id}/appointments/{appointment_id}/deposit", post(appointment::deposit_callback))

        // Analytics
        .route("/api/v1/{contractor_id}/analytics", get(analytics::get_analytics))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        contractor_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
