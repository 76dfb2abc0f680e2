use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bookable service offered by a contractor. Once an appointment references
/// a service, its time components (duration, prep, cleanup) are frozen so
/// existing appointments keep their computed span.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ServiceDefinition {
    pub id: String,
    pub contractor_id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i32,
    pub prep_min: i32,
    pub cleanup_min: i32,
    pub price_cents: i64,
    pub deposit_percent_override: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewServiceParams {
    pub contractor_id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i32,
    pub prep_min: i32,
    pub cleanup_min: i32,
    pub price_cents: i64,
    pub deposit_percent_override: Option<i32>,
    pub active: bool,
}

impl ServiceDefinition {
    pub fn new(params: NewServiceParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            contractor_id: params.contractor_id,
            name: params.name,
            description: params.description,
            duration_min: params.duration_min,
            prep_min: params.prep_min,
            cleanup_min: params.cleanup_min,
            price_cents: params.price_cents,
            deposit_percent_override: params.deposit_percent_override,
            active: params.active,
            created_at: Utc::now(),
        }
    }

    /// Full span a booking of this service occupies: prep + duration + cleanup.
    pub fn block_minutes(&self) -> i64 {
        (self.prep_min + self.duration_min + self.cleanup_min) as i64
    }
}
