use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{
    AppointmentRepository, NotificationService, PaymentGateway, ScheduleRepository,
    ServiceRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub schedule_repo: Arc<dyn ScheduleRepository>,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub appointment_repo: Arc<dyn AppointmentRepository>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn NotificationService>,
}
