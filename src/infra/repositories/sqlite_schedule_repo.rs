use crate::domain::{models::schedule::ScheduleConfig, ports::ScheduleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteScheduleRepo {
    pool: SqlitePool,
}

impl SqliteScheduleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for SqliteScheduleRepo {
    async fn upsert(&self, config: &ScheduleConfig) -> Result<ScheduleConfig, AppError> {
        sqlx::query_as::<_, ScheduleConfig>(
            "INSERT INTO schedule_configs (contractor_id, timezone, hours_json, blackout_json, recurring_json, buffer_min, slot_interval_min, advance_booking_days, min_notice_min, accepting_bookings, auto_confirm, requires_deposit, deposit_percent, cancellation_json, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(contractor_id) DO UPDATE SET
                timezone = excluded.timezone,
                hours_json = excluded.hours_json,
                blackout_json = excluded.blackout_json,
                recurring_json = excluded.recurring_json,
                buffer_min = excluded.buffer_min,
                slot_interval_min = excluded.slot_interval_min,
                advance_booking_days = excluded.advance_booking_days,
                min_notice_min = excluded.min_notice_min,
                accepting_bookings = excluded.accepting_bookings,
                auto_confirm = excluded.auto_confirm,
                requires_deposit = excluded.requires_deposit,
                deposit_percent = excluded.deposit_percent,
                cancellation_json = excluded.cancellation_json,
                updated_at = excluded.updated_at
             RETURNING *",
        )
        .bind(&config.contractor_id)
        .bind(&config.timezone)
        .bind(&config.hours_json)
        .bind(&config.blackout_json)
        .bind(&config.recurring_json)
        .bind(config.buffer_min)
        .bind(config.slot_interval_min)
        .bind(config.advance_booking_days)
        .bind(config.min_notice_min)
        .bind(config.accepting_bookings)
        .bind(config.auto_confirm)
        .bind(config.requires_deposit)
        .bind(config.deposit_percent)
        .bind(&config.cancellation_json)
        .bind(config.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_contractor(&self, contractor_id: &str) -> Result<Option<ScheduleConfig>, AppError> {
        sqlx::query_as::<_, ScheduleConfig>("SELECT * FROM schedule_configs WHERE contractor_id = ?")
            .bind(contractor_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
