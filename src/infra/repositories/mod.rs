pub mod postgres_appointment_repo;
pub mod postgres_schedule_repo;
pub mod postgres_service_repo;
pub mod sqlite_appointment_repo;
pub mod sqlite_schedule_repo;
pub mod sqlite_service_repo;

/// Statuses that hold a slot and participate in conflict checks.
pub const ACTIVE_STATUSES_SQL: &str = "('REQUESTED', 'CONFIRMED')";

/// How often a write is retried when the storage layer reports a transient
/// failure. Business-rule rejections are never retried.
pub const WRITE_RETRIES: u32 = 3;

/// Transient storage failures worth a bounded retry: SQLite busy/locked and
/// Postgres serialization/deadlock failures.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => match db.code() {
            Some(code) => {
                let code = code.as_ref();
                code == "5" || code == "6" || code == "40001" || code == "40P01"
            }
            None => false,
        },
        sqlx::Error::PoolTimedOut => true,
        _ => false,
    }
}
