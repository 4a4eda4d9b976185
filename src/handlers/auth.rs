// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentAdmin,
    models::{
        admin::{AdminProfile, LoginPayload},
        session::LoginResponse,
    },
};

#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Logged in; token and branch context", body = LoginResponse),
        (status = 401, description = "Invalid username/email or password"),
        (status = 403, description = "Account disabled")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.identifier.trim().is_empty() {
        return Err(AppError::field(
            "identifier",
            "required",
            "Enter your username or email.",
        ));
    }

    let response = app_state.auth.login(payload).await?;
    tracing::info!("🔐 Admin '{}' logged in", response.user.username);
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/admin/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session ended"),
        (status = 401, description = "Not authenticated")
    ),
    security(("api_jwt" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
) -> Result<impl IntoResponse, AppError> {
    app_state.auth.logout(session.admin.id).await?;
    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

#[utoipa::path(
    get,
    path = "/api/admin/me",
    tag = "Auth",
    responses(
        (status = 200, description = "The logged-in admin", body = AdminProfile),
        (status = 401, description = "Not authenticated")
    ),
    security(("api_jwt" = []))
)]
pub async fn me(CurrentAdmin(session): CurrentAdmin) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(session.admin.profile())))
}
