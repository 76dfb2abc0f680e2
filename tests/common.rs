use scheduling_engine::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::repositories::{
        sqlite_appointment_repo::SqliteAppointmentRepo,
        sqlite_schedule_repo::SqliteScheduleRepo,
        sqlite_service_repo::SqliteServiceRepo,
    },
    domain::models::appointment::Appointment,
    domain::ports::{NotificationService, PaymentGateway},
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;
use axum::Router;
use std::str::FromStr;
use async_trait::async_trait;

pub struct MockPaymentGateway {
    pub intents: AtomicUsize,
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_deposit_intent(
        &self,
        _contractor_id: &str,
        _appointment_id: &str,
        _amount_cents: i64,
    ) -> Result<String, AppError> {
        let n = self.intents.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("pay_mock_{}", n))
    }
}

pub struct MockNotificationService;

#[async_trait]
impl NotificationService for MockNotificationService {
    async fn appointment_booked(&self, _appointment: &Appointment) -> Result<(), AppError> {
        Ok(())
    }

    async fn appointment_cancelled(
        &self,
        _appointment: &Appointment,
        _refund_cents: i64,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub payments: Arc<MockPaymentGateway>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            payment_service_url: "http://localhost".to_string(),
            payment_service_token: "token".to_string(),
            notify_service_url: "http://localhost".to_string(),
            notify_service_token: "token".to_string(),
        };

        let payments = Arc::new(MockPaymentGateway {
            intents: AtomicUsize::new(0),
        });

        let state = Arc::new(AppState {
            config,
            schedule_repo: Arc::new(SqliteScheduleRepo::new(pool.clone())),
            service_repo: Arc::new(SqliteServiceRepo::new(pool.clone())),
            appointment_repo: Arc::new(SqliteAppointmentRepo::new(pool.clone())),
            payment_gateway: payments.clone(),
            notifier: Arc::new(MockNotificationService),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            payments,
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
