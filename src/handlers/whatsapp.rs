// src/handlers/whatsapp.rs

use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, text},
    config::AppState,
    middleware::auth::CurrentAdmin,
    services::notification::{send_with_timeout, OutboundMessage, WhatsappTestPayload, WhatsappTestResponse},
};

// POST /api/whatsapp/test
// Envio com falha ainda responde 200; o resultado vai em `success`
#[utoipa::path(
    post,
    path = "/api/whatsapp/test",
    tag = "Notifications",
    request_body = WhatsappTestPayload,
    responses(
        (status = 200, description = "Outcome of the test send", body = WhatsappTestResponse),
        (status = 400, description = "Invalid phone number")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_test_message(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    Json(payload): Json<WhatsappTestPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let phone = text::digits_only(&payload.phone_number);
    if phone.len() < 10 {
        return Err(AppError::field(
            "phoneNumber",
            "invalid_phone",
            "Enter a phone number with at least 10 digits.",
        ));
    }

    let branch = Some(payload.branch.trim().to_string())
        .filter(|b| !b.is_empty())
        .or_else(|| session.access.current_branch.clone())
        .unwrap_or_default();
    let message = OutboundMessage {
        to: phone,
        branch,
        text: Some(payload.message.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Test message from the salon admin console.".to_string()),
    };

    let response = match send_with_timeout(
        app_state.notifier.as_ref(),
        &message,
        app_state.settings.notify_timeout,
    )
    .await
    {
        Ok(details) => WhatsappTestResponse {
            success: true,
            message: "Test message sent.".to_string(),
            details: Some(details),
        },
        Err(e) => {
            tracing::warn!("WhatsApp test message to {} failed: {}", message.to, e);
            WhatsappTestResponse {
                success: false,
                message: "The test message could not be sent.".to_string(),
                details: Some(e.to_string()),
            }
        }
    };
    Ok(Json(response))
}
