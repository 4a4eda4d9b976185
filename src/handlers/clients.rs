// src/handlers/clients.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::CurrentAdmin, branch::BranchScope},
    models::client::{Client, ClientDraft, ClientPatch, ClientQuery, ImportSummary},
    services::client_service,
};

use super::uploads::read_files;

#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    params(ClientQuery, ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "Filtered and sorted clients", body = Vec<Client>)),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Query(query): Query<ClientQuery>,
) -> Result<impl IntoResponse, AppError> {
    let records = app_state.clients.records.list(&branch).await?;
    Ok(Json(client_service::list_view(&records, &query)))
}

#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = ClientDraft,
    params(("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Json(payload): Json<ClientDraft>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let client = app_state.clients.records.add(&branch, payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

#[utoipa::path(
    patch,
    path = "/api/clients/{id}",
    tag = "Clients",
    request_body = ClientPatch,
    params(("id" = Uuid, Path, description = "Client id"), ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses(
        (status = 200, description = "Client updated", body = Client),
        (status = 404, description = "Unknown client")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientPatch>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.clients.records.edit(&branch, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client id"), ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "Client deleted", body = Client)),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.clients.records.delete(&session.access, &branch, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/clients/export",
    tag = "Clients",
    params(("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "CSV download", content_type = "text/csv", body = String)),
    security(("api_jwt" = []))
)]
pub async fn export_clients(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
) -> Result<impl IntoResponse, AppError> {
    let csv = app_state.clients.export(&branch).await?;
    let disposition = format!("attachment; filename=\"clients-{branch}.csv\"");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

// POST /api/clients/import (multipart, um arquivo `.csv`, `.xlsx` ou `.xls`)
#[utoipa::path(
    post,
    path = "/api/clients/import",
    tag = "Clients",
    params(("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses(
        (status = 200, description = "Rows imported and rejected", body = ImportSummary),
        (status = 415, description = "Unsupported file type"),
        (status = 422, description = "File could not be parsed")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_clients(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let file = read_files(multipart)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::BadRequest("Attach a CSV or Excel file to import.".into()))?;

    let summary = app_state.clients.import(&branch, &file.name, file.bytes).await?;
    Ok(Json(summary))
}
