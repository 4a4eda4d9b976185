// src/handlers/session.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentAdmin,
    models::session::{SessionBranches, SwitchBranchPayload, SwitchBranchResponse},
};

// GET /api/session/branches
#[utoipa::path(
    get,
    path = "/api/session/branches",
    tag = "Session",
    responses(
        (status = 200, description = "Branches the admin may pick from", body = SessionBranches),
        (status = 401, description = "Not authenticated")
    ),
    security(("api_jwt" = []))
)]
pub async fn branches_for_select(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
) -> Result<impl IntoResponse, AppError> {
    let registry = app_state.registry.all().await;
    let access = &session.access;

    Ok((
        StatusCode::OK,
        Json(SessionBranches {
            current_branch: access.current_branch.clone(),
            is_super_admin: access.is_super_admin(),
            branches: access.branches_for_select(&registry),
        }),
    ))
}

// POST /api/session/branch
// Filial fora do acesso não muda nada e volta com `switched: false`
#[utoipa::path(
    post,
    path = "/api/session/branch",
    tag = "Session",
    request_body = SwitchBranchPayload,
    responses(
        (status = 200, description = "Result of the switch", body = SwitchBranchResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("api_jwt" = []))
)]
pub async fn switch_branch(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    Json(payload): Json<SwitchBranchPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut access = session.access;
    let switched = app_state
        .auth
        .sessions()
        .switch_branch(&mut access, payload.branch_id.trim())
        .await?;

    let warning = (!switched).then(|| format!("You do not have access to branch '{}'.", payload.branch_id));
    Ok((
        StatusCode::OK,
        Json(SwitchBranchResponse {
            switched,
            current_branch: access.current_branch,
            warning,
        }),
    ))
}
