use crate::domain::{models::service::ServiceDefinition, ports::ServiceRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresServiceRepo {
    pool: PgPool,
}

impl PostgresServiceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for PostgresServiceRepo {
    async fn create(&self, service: &ServiceDefinition) -> Result<ServiceDefinition, AppError> {
        sqlx::query_as::<_, ServiceDefinition>(
            "INSERT INTO services (id, contractor_id, name, description, duration_min, prep_min, cleanup_min, price_cents, deposit_percent_override, active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
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
            "SELECT * FROM services WHERE contractor_id = $1 AND id = $2",
        )
        .bind(contractor_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list(&self, contractor_id: &str) -> Result<Vec<ServiceDefinition>, AppError> {
        sqlx::query_as::<_, ServiceDefinition>(
            "SELECT * FROM services WHERE contractor_id = $1 ORDER BY created_at ASC",
        )
        .bind(contractor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn update(&self, service: &ServiceDefinition) -> Result<ServiceDefinition, AppError> {
        sqlx::query_as::<_, ServiceDefinition>(
            "UPDATE services SET name = $1, description = $2, duration_min = $3, prep_min = $4, cleanup_min = $5, price_cents = $6, deposit_percent_override = $7, active = $8
             WHERE contractor_id = $9 AND id = $10
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
