// src/handlers/branches.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentAdmin,
    models::branch::{is_default_branch, Branch, BranchDraft, BranchOption, BranchPatch},
};

// ---
// Público: filiais ativas para o site de agendamento
// ---
#[utoipa::path(
    get,
    path = "/api/public/branches",
    tag = "Public",
    responses((status = 200, description = "Active branches", body = Vec<BranchOption>))
)]
pub async fn list_public_branches(State(app_state): State<AppState>) -> impl IntoResponse {
    let branches: Vec<BranchOption> = app_state
        .registry
        .active()
        .await
        .iter()
        .map(Branch::to_option)
        .collect();
    Json(branches)
}

// ---
// Gestão do registro (super admin)
// ---
#[utoipa::path(
    get,
    path = "/api/branches",
    tag = "Branches",
    responses(
        (status = 200, description = "All registered branches", body = Vec<Branch>),
        (status = 403, description = "Super admin only")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_branches(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
) -> Result<impl IntoResponse, AppError> {
    session.access.require_super_admin("manage branches")?;
    Ok(Json(app_state.registry.all().await))
}

#[utoipa::path(
    post,
    path = "/api/branches",
    tag = "Branches",
    request_body = BranchDraft,
    responses(
        (status = 201, description = "Branch created", body = Branch),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "A branch with the same id exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_branch(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    Json(payload): Json<BranchDraft>,
) -> Result<impl IntoResponse, AppError> {
    session.access.require_super_admin("manage branches")?;
    payload.validate()?;

    let branch = app_state.admins.add_branch(payload).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

#[utoipa::path(
    patch,
    path = "/api/branches/{id}",
    tag = "Branches",
    request_body = BranchPatch,
    params(("id" = String, Path, description = "Branch id")),
    responses(
        (status = 200, description = "Branch updated", body = Branch),
        (status = 404, description = "Unknown branch")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_branch(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    Path(id): Path<String>,
    Json(payload): Json<BranchPatch>,
) -> Result<impl IntoResponse, AppError> {
    session.access.require_super_admin("manage branches")?;

    let branch = app_state
        .registry
        .update_branch(&id, payload)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No branch with id '{id}'")))?;
    Ok(Json(branch))
}

#[utoipa::path(
    delete,
    path = "/api/branches/{id}",
    tag = "Branches",
    params(("id" = String, Path, description = "Branch id")),
    responses(
        (status = 200, description = "Branch deleted"),
        (status = 404, description = "Unknown branch"),
        (status = 409, description = "Default branch, or the only branch of some admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_branch(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    session.access.require_super_admin("manage branches")?;

    if app_state.admins.delete_branch(&id).await? {
        return Ok(Json(json!({ "success": true, "deleted": id })));
    }
    if is_default_branch(&id) {
        Err(AppError::Conflict(format!("'{id}' is a default branch and cannot be deleted.")))
    } else {
        Err(AppError::NotFound(format!("No branch with id '{id}'")))
    }
}
