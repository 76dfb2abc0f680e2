use crate::domain::ports::PaymentGateway;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Thin client for the external payment collaborator. The engine only asks
/// it to open a deposit intent and stores the returned reference; capture,
/// settlement and refund execution happen on the other side.
pub struct HttpPaymentGateway {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpPaymentGateway {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct IntentPayload<'a> {
    contractor_id: &'a str,
    appointment_id: &'a str,
    amount_cents: i64,
}

#[derive(Deserialize)]
struct IntentResponse {
    reference: String,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_deposit_intent(
        &self,
        contractor_id: &str,
        appointment_id: &str,
        amount_cents: i64,
    ) -> Result<String, AppError> {
        let payload = IntentPayload {
            contractor_id,
            appointment_id,
            amount_cents,
        };

        let res = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Payment service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Payment service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        let body: IntentResponse = res.json().await.map_err(|e| {
            AppError::InternalWithMsg(format!("Payment service returned invalid body: {}", e))
        })?;
        Ok(body.reference)
    }
}
