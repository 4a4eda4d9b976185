// src/services/notification.rs

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::error::AppError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Só dígitos.
    pub to: String,
    pub branch: String,
    pub text: String,
}

/// Destino das confirmações de agendamento e das mensagens de teste. O envio em si é opaco.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &'static str;

    /// Em caso de sucesso, devolve uma nota curta de entrega.
    async fn send(&self, message: &OutboundMessage) -> Result<String, AppError>;
}

/// Só registra no log, sem entregar. Usado quando não há webhook configurado.
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &OutboundMessage) -> Result<String, AppError> {
        tracing::info!(
            "📨 [{}] WhatsApp to {}: {}",
            message.branch,
            message.to,
            message.text
        );
        Ok("logged".to_string())
    }
}

/// Faz POST da mensagem em JSON para o webhook do gateway de WhatsApp.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, message: &OutboundMessage) -> Result<String, AppError> {
        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Webhook request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("Webhook answered {}", status).into());
        }
        Ok(format!("delivered ({status})"))
    }
}

/// Timeout conta como falha de envio.
pub async fn send_with_timeout(
    sink: &dyn NotificationSink,
    message: &OutboundMessage,
    timeout: Duration,
) -> Result<String, AppError> {
    match tokio::time::timeout(timeout, sink.send(message)).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!("{} notifier timed out after {:?}", sink.name(), timeout).into()),
    }
}

// ---
// POST /api/whatsapp/test
// ---
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WhatsappTestPayload {
    #[validate(length(min = 10, message = "Enter a phone number with at least 10 digits."))]
    pub phone_number: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WhatsappTestResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
