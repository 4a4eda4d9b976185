// src/handlers/admins.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentAdmin,
    models::admin::{AdminDraft, AdminProfile},
};

// O próprio diretório exige super admin em todos estes handlers

#[utoipa::path(
    get,
    path = "/api/admins",
    tag = "Admins",
    responses(
        (status = 200, description = "All admin accounts", body = Vec<AdminProfile>),
        (status = 403, description = "Super admin only")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_admins(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.admins.list(&session.access).await?))
}

#[utoipa::path(
    get,
    path = "/api/admins/{id}",
    tag = "Admins",
    params(("id" = Uuid, Path, description = "Admin id")),
    responses(
        (status = 200, description = "One admin account", body = AdminProfile),
        (status = 404, description = "Unknown admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_admin(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.admins.get(&session.access, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admins",
    tag = "Admins",
    request_body = AdminDraft,
    responses(
        (status = 201, description = "Admin created", body = AdminProfile),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Username or email already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_admin(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    Json(payload): Json<AdminDraft>,
) -> Result<impl IntoResponse, AppError> {
    let admin = app_state.admins.add_admin(&session.access, payload).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

#[utoipa::path(
    patch,
    path = "/api/admins/{id}",
    tag = "Admins",
    request_body = AdminDraft,
    params(("id" = Uuid, Path, description = "Admin id")),
    responses(
        (status = 200, description = "Admin updated", body = AdminProfile),
        (status = 404, description = "Unknown admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_admin(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminDraft>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.admins.edit_admin(&session.access, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admins/{id}",
    tag = "Admins",
    params(("id" = Uuid, Path, description = "Admin id")),
    responses(
        (status = 200, description = "Admin deleted", body = AdminProfile),
        (status = 403, description = "Super admins cannot be deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_admin(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.admins.delete_admin(&session.access, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admins/{id}/toggle-status",
    tag = "Admins",
    params(("id" = Uuid, Path, description = "Admin id")),
    responses(
        (status = 200, description = "Active flag flipped", body = AdminProfile),
        (status = 400, description = "Cannot toggle your own account")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_admin_status(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.admins.toggle_status(&session.access, id).await?))
}
