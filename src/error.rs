use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),
    #[error("Minimum notice violated: {0}")]
    NoticeViolation(String),
    #[error("Booking horizon exceeded: {0}")]
    HorizonViolation(String),
    #[error("Policy violation: {0}")]
    PolicyViolation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    /// Stable machine-readable name of the rule that rejected the request.
    pub fn rule(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation",
            AppError::SlotUnavailable(_) => "slot_unavailable",
            AppError::NoticeViolation(_) => "notice_violation",
            AppError::HorizonViolation(_) => "horizon_violation",
            AppError::PolicyViolation(_) => "policy_violation",
            AppError::Conflict(_) => "conflict",
            AppError::Internal | AppError::InternalWithMsg(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let rule = self.rule();
        let (status, message) = match &self {
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::SlotUnavailable(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::NoticeViolation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::HorizonViolation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::PolicyViolation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "rule": rule,
        }));

        (status, body).into_response()
    }
}
