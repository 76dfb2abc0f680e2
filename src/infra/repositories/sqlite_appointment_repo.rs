use crate::domain::{models::appointment::Appointment, ports::AppointmentRepository};
use crate::error::AppError;
use crate::infra::repositories::{is_transient, ACTIVE_STATUSES_SQL, WRITE_RETRIES};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::warn;

pub struct SqliteAppointmentRepo {
    pool: SqlitePool,
}

impl SqliteAppointmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn try_insert_if_free(
        &self,
        appointment: &Appointment,
        conflict_start: DateTime<Utc>,
        conflict_end: DateTime<Utc>,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        // Conflict check and insert execute as one statement, so SQLite's
        // single-writer semantics decide racing bookings atomically.
        let sql = format!(
            "INSERT INTO appointments (id, contractor_id, client_id, service_id, start_time, end_time, status, price_cents, deposit_required, deposit_cents, deposit_paid, payment_status, payment_ref, refund_cents, refund_reason, client_name, client_email, client_note, created_at, cancelled_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
             WHERE NOT EXISTS (
                 SELECT 1 FROM appointments
                 WHERE contractor_id = ? AND status IN {ACTIVE_STATUSES_SQL}
                   AND start_time < ? AND end_time > ?
             )
             RETURNING *"
        );
        sqlx::query_as::<_, Appointment>(&sql)
            .bind(&appointment.id)
            .bind(&appointment.contractor_id)
            .bind(&appointment.client_id)
            .bind(&appointment.service_id)
            .bind(appointment.start_time)
            .bind(appointment.end_time)
            .bind(&appointment.status)
            .bind(appointment.price_cents)
            .bind(appointment.deposit_required)
            .bind(appointment.deposit_cents)
            .bind(appointment.deposit_paid)
            .bind(&appointment.payment_status)
            .bind(&appointment.payment_ref)
            .bind(appointment.refund_cents)
            .bind(&appointment.refund_reason)
            .bind(&appointment.client_name)
            .bind(&appointment.client_email)
            .bind(&appointment.client_note)
            .bind(appointment.created_at)
            .bind(appointment.cancelled_at)
            .bind(&appointment.contractor_id)
            .bind(conflict_end)
            .bind(conflict_start)
            .fetch_optional(&self.pool)
            .await
    }
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepo {
    async fn create_if_free(
        &self,
        appointment: &Appointment,
        conflict_start: DateTime<Utc>,
        conflict_end: DateTime<Utc>,
    ) -> Result<Appointment, AppError> {
        let mut attempt = 0;
        loop {
            match self
                .try_insert_if_free(appointment, conflict_start, conflict_end)
                .await
            {
                Ok(Some(created)) => return Ok(created),
                Ok(None) => {
                    return Err(AppError::Conflict(
                        "Slot no longer available; it was taken by a concurrent booking".into(),
                    ))
                }
                Err(e) if is_transient(&e) && attempt < WRITE_RETRIES => {
                    attempt += 1;
                    warn!("Transient SQLite error on booking insert (attempt {}): {:?}", attempt, e);
                }
                Err(e) => return Err(AppError::Database(e)),
            }
        }
    }

    async fn find_by_id(&self, contractor_id: &str, id: &str) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE contractor_id = ? AND id = ?",
        )
        .bind(contractor_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_by_contractor(&self, contractor_id: &str) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE contractor_id = ? ORDER BY start_time ASC",
        )
        .bind(contractor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_in_range(
        &self,
        contractor_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE contractor_id = ? AND start_time >= ? AND start_time < ? ORDER BY start_time ASC",
        )
        .bind(contractor_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_active_overlapping(
        &self,
        contractor_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppError> {
        let sql = format!(
            "SELECT * FROM appointments
             WHERE contractor_id = ? AND status IN {ACTIVE_STATUSES_SQL}
               AND start_time < ? AND end_time > ?
             ORDER BY start_time ASC"
        );
        sqlx::query_as::<_, Appointment>(&sql)
            .bind(contractor_id)
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_for_service(&self, service_id: &str) -> Result<i64, AppError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM appointments WHERE service_id = ?")
                .bind(service_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;
        Ok(count.0)
    }

    async fn cancel(
        &self,
        contractor_id: &str,
        id: &str,
        refund_cents: i64,
        refund_reason: &str,
        payment_status: &str,
        cancelled_at: DateTime<Utc>,
    ) -> Result<Appointment, AppError> {
        let sql = format!(
            "UPDATE appointments
             SET status = 'CANCELLED', refund_cents = ?, refund_reason = ?, payment_status = ?, cancelled_at = ?
             WHERE contractor_id = ? AND id = ? AND status IN {ACTIVE_STATUSES_SQL}
             RETURNING *"
        );
        sqlx::query_as::<_, Appointment>(&sql)
            .bind(refund_cents)
            .bind(refund_reason)
            .bind(payment_status)
            .bind(cancelled_at)
            .bind(contractor_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::Conflict("Appointment is no longer active".into()))
    }

    async fn set_status(
        &self,
        contractor_id: &str,
        id: &str,
        from: &str,
        to: &str,
    ) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status = ? WHERE contractor_id = ? AND id = ? AND status = ? RETURNING *",
        )
        .bind(to)
        .bind(contractor_id)
        .bind(id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::Conflict("Appointment changed state concurrently".into()))
    }

    async fn set_deposit(
        &self,
        contractor_id: &str,
        id: &str,
        paid: bool,
        payment_ref: Option<String>,
        payment_status: &str,
    ) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET deposit_paid = ?, payment_ref = COALESCE(?, payment_ref), payment_status = ?
             WHERE contractor_id = ? AND id = ?
             RETURNING *",
        )
        .bind(paid)
        .bind(payment_ref)
        .bind(payment_status)
        .bind(contractor_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound("Appointment not found".into()))
    }
}
