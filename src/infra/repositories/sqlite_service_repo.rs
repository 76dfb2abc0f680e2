use crate::domain::{models::service::ServiceDefinition, ports::ServiceRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteServiceRepo {
    pool: SqlitePool,
}

impl SqliteServiceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for SqliteServiceRepo {
    async fn create(&self, service: &ServiceDefinition) -> Result<ServiceDefinition, AppError> {
        sqlx::query_as::<_, ServiceDefinition>(
            "INSERT INTO services (id, contractor_id, name, description, duration_min, prep_min, cleanup_min, price_cents, deposit_percent_override, active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&service.id)
        .bind(&service.contractor_id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.duration_min)
        .bind(service.prep_min)
        .bind(service.cleanup_min)
        .bind(service.price_cents)
        .bind(service.deposit_percent_override)
        .bind(service.active)
        .bind(service.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_id(&self, contractor_id: &str, id: &str) -> Result<Option<ServiceDefinition>, AppError> {
        sqlx::query_as::<_, ServiceDefinition>(
            "SELECT * FROM services WHERE contractor_id = ? AND id = ?",
        )
        .bind(contractor_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list(&self, contractor_id: &str) -> Result<Vec<ServiceDefinition>, AppError> {
        sqlx::query_as::<_, ServiceDefinition>(
            "SELECT * FROM services WHERE contractor_id = ? ORDER BY created_at ASC",
        )
        .bind(contractor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn update(&self, service: &ServiceDefinition) -> Result<ServiceDefinition, AppError> {
        sqlx::query_as::<_, ServiceDefinition>(
            "UPDATE services SET name = ?, description = ?, duration_min = ?, prep_min = ?, cleanup_min = ?, price_cents = ?, deposit_percent_override = ?, active = ?
             WHERE contractor_id = ? AND id = ?
             RETURNING *",
        )
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.duration_min)
        .bind(service.prep_min)
        .bind(service.cleanup_min)
        .bind(service.price_cents)
        .bind(service.deposit_percent_override)
        .bind(service.active)
        .bind(&service.contractor_id)
        .bind(&service.id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }
}
