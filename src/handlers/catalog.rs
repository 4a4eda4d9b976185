// src/handlers/catalog.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::CurrentAdmin, branch::BranchScope},
    models::catalog::{
        CatalogQuery, ServiceDraft, ServiceOffering, ServicePatch, Stylist, StylistDraft, StylistPatch,
    },
    services::catalog_service,
};

async fn require_active_branch(app_state: &AppState, branch: &str) -> Result<(), AppError> {
    match app_state.registry.get(branch).await {
        Some(b) if b.is_active() => Ok(()),
        _ => Err(AppError::NotFound(format!("No active branch '{branch}'"))),
    }
}

// ---
// Catálogo público (site de agendamento)
// ---
#[utoipa::path(
    get,
    path = "/api/catalog/{branch}/services",
    tag = "Public",
    params(("branch" = String, Path, description = "Branch id"), CatalogQuery),
    responses(
        (status = 200, description = "Services offered at the branch", body = Vec<ServiceOffering>),
        (status = 404, description = "Unknown or inactive branch")
    )
)]
pub async fn public_services(
    State(app_state): State<AppState>,
    Path(branch): Path<String>,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_active_branch(&app_state, &branch).await?;
    let records = app_state.services.list(&branch).await?;
    Ok(Json(catalog_service::filter_services(&records, &query)))
}

#[utoipa::path(
    get,
    path = "/api/catalog/{branch}/stylists",
    tag = "Public",
    params(("branch" = String, Path, description = "Branch id")),
    responses(
        (status = 200, description = "Active stylists at the branch", body = Vec<Stylist>),
        (status = 404, description = "Unknown or inactive branch")
    )
)]
pub async fn public_stylists(
    State(app_state): State<AppState>,
    Path(branch): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_active_branch(&app_state, &branch).await?;
    let records = app_state.stylists.list(&branch).await?;
    Ok(Json(catalog_service::public_stylists(&records)))
}

// ---
// Serviços (gestão por filial)
// ---
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Catalog",
    params(CatalogQuery, ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "Services", body = Vec<ServiceOffering>)),
    security(("api_jwt" = []))
)]
pub async fn list_services(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let records = app_state.services.list(&branch).await?;
    Ok(Json(catalog_service::filter_services(&records, &query)))
}

#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Catalog",
    request_body = ServiceDraft,
    params(("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 201, description = "Service created", body = ServiceOffering)),
    security(("api_jwt" = []))
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Json(payload): Json<ServiceDraft>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let service = app_state.services.add(&branch, payload).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

#[utoipa::path(
    patch,
    path = "/api/services/{id}",
    tag = "Catalog",
    request_body = ServicePatch,
    params(("id" = Uuid, Path, description = "Service id"), ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "Service updated", body = ServiceOffering)),
    security(("api_jwt" = []))
)]
pub async fn update_service(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
    Json(payload): Json<ServicePatch>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.services.edit(&branch, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Service id"), ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "Service deleted", body = ServiceOffering)),
    security(("api_jwt" = []))
)]
pub async fn delete_service(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.services.delete(&session.access, &branch, id).await?))
}

// ---
// Profissionais (gestão por filial)
// ---
#[utoipa::path(
    get,
    path = "/api/stylists",
    tag = "Catalog",
    params(CatalogQuery, ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "Stylists, inactive ones included", body = Vec<Stylist>)),
    security(("api_jwt" = []))
)]
pub async fn list_stylists(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let records = app_state.stylists.list(&branch).await?;
    Ok(Json(catalog_service::filter_stylists(&records, &query)))
}

#[utoipa::path(
    post,
    path = "/api/stylists",
    tag = "Catalog",
    request_body = StylistDraft,
    params(("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 201, description = "Stylist created", body = Stylist)),
    security(("api_jwt" = []))
)]
pub async fn create_stylist(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Json(payload): Json<StylistDraft>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let stylist = app_state.stylists.add(&branch, payload).await?;
    Ok((StatusCode::CREATED, Json(stylist)))
}

#[utoipa::path(
    patch,
    path = "/api/stylists/{id}",
    tag = "Catalog",
    request_body = StylistPatch,
    params(("id" = Uuid, Path, description = "Stylist id"), ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "Stylist updated", body = Stylist)),
    security(("api_jwt" = []))
)]
pub async fn update_stylist(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
    Json(payload): Json<StylistPatch>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.stylists.edit(&branch, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/stylists/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Stylist id"), ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "Stylist deleted", body = Stylist)),
    security(("api_jwt" = []))
)]
pub async fn delete_stylist(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.stylists.delete(&session.access, &branch, id).await?))
}
