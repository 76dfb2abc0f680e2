use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::{
    appointment::Appointment, schedule::ScheduleConfig, service::ServiceDefinition,
};
use crate::error::AppError;

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn upsert(&self, config: &ScheduleConfig) -> Result<ScheduleConfig, AppError>;
    async fn find_by_contractor(&self, contractor_id: &str) -> Result<Option<ScheduleConfig>, AppError>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &ServiceDefinition) -> Result<ServiceDefinition, AppError>;
    async fn find_by_id(&self, contractor_id: &str, id: &str) -> Result<Option<ServiceDefinition>, AppError>;
    async fn list(&self, contractor_id: &str) -> Result<Vec<ServiceDefinition>, AppError>;
    async fn update(&self, service: &ServiceDefinition) -> Result<ServiceDefinition, AppError>;
}

/// The appointment ledger. The only concurrency-sensitive port: `create_if_free`
/// must decide the conflict check and the insert atomically against current
/// ledger state so that of two racing bookings for overlapping slots exactly
/// one commits.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Inserts the appointment unless an active appointment for the same
    /// contractor intersects `[conflict_start, conflict_end)`; losing the
    /// check yields `AppError::Conflict`.
    async fn create_if_free(
        &self,
        appointment: &Appointment,
        conflict_start: DateTime<Utc>,
        conflict_end: DateTime<Utc>,
    ) -> Result<Appointment, AppError>;

    async fn find_by_id(&self, contractor_id: &str, id: &str) -> Result<Option<Appointment>, AppError>;
    async fn list_by_contractor(&self, contractor_id: &str) -> Result<Vec<Appointment>, AppError>;

    /// All appointments whose start falls in `[start, end)`, any status.
    async fn list_in_range(
        &self,
        contractor_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppError>;

    /// REQUESTED/CONFIRMED appointments whose span intersects `[start, end)`.
    async fn list_active_overlapping(
        &self,
        contractor_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppError>;

    async fn count_for_service(&self, service_id: &str) -> Result<i64, AppError>;

    /// Guarded REQUESTED|CONFIRMED -> CANCELLED transition recording the
    /// refund decision; racing against another transition yields Conflict.
    async fn cancel(
        &self,
        contractor_id: &str,
        id: &str,
        refund_cents: i64,
        refund_reason: &str,
        payment_status: &str,
        cancelled_at: DateTime<Utc>,
    ) -> Result<Appointment, AppError>;

    /// Optimistically guarded status change: applies only while the row still
    /// holds `from`.
    async fn set_status(
        &self,
        contractor_id: &str,
        id: &str,
        from: &str,
        to: &str,
    ) -> Result<Appointment, AppError>;

    /// Payment reconciliation callback target; never re-validates the slot.
    async fn set_deposit(
        &self,
        contractor_id: &str,
        id: &str,
        paid: bool,
        payment_ref: Option<String>,
        payment_status: &str,
    ) -> Result<Appointment, AppError>;
}

/// External payment collaborator. The ledger records the returned reference
/// and status only; money movement happens elsewhere.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_deposit_intent(
        &self,
        contractor_id: &str,
        appointment_id: &str,
        amount_cents: i64,
    ) -> Result<String, AppError>;
}

/// External notification collaborator; fire-and-forget, failures are logged
/// and never roll back ledger state.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn appointment_booked(&self, appointment: &Appointment) -> Result<(), AppError>;
    async fn appointment_cancelled(
        &self,
        appointment: &Appointment,
        refund_cents: i64,
    ) -> Result<(), AppError>;
}
