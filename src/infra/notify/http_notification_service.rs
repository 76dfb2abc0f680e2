use crate::domain::models::appointment::Appointment;
use crate::domain::ports::NotificationService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

pub struct HttpNotificationService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpNotificationService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }

    async fn post(&self, payload: &NotifyPayload<'_>) -> Result<(), AppError> {
        let res = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Notification service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Notification service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct NotifyPayload<'a> {
    kind: &'static str,
    appointment_id: &'a str,
    contractor_id: &'a str,
    recipient: &'a str,
    start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    refund_cents: Option<i64>,
}

#[async_trait]
impl NotificationService for HttpNotificationService {
    async fn appointment_booked(&self, appointment: &Appointment) -> Result<(), AppError> {
        self.post(&NotifyPayload {
            kind: "booking_confirmation",
            appointment_id: &appointment.id,
            contractor_id: &appointment.contractor_id,
            recipient: &appointment.client_email,
            start_time: appointment.start_time.to_rfc3339(),
            refund_cents: None,
        })
        .await
    }

    async fn appointment_cancelled(
        &self,
        appointment: &Appointment,
        refund_cents: i64,
    ) -> Result<(), AppError> {
        self.post(&NotifyPayload {
            kind: "cancellation",
            appointment_id: &appointment.id,
            contractor_id: &appointment.contractor_id,
            recipient: &appointment.client_email,
            start_time: appointment.start_time.to_rfc3339(),
            refund_cents: Some(refund_cents),
        })
        .await
    }
}
