// src/handlers/products.rs

use axum::{
    extract::{Multipart, Path, Query, State},
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
    models::{
        media::{AltTextPayload, MediaAttachment, MediaUploadResponse},
        product::{Product, ProductDraft, ProductPatch, ProductQuery},
    },
    services::product_service,
};

use super::uploads::read_files;

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(ProductQuery, ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "Products matching the search, category and stock filters", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, AppError> {
    let records = app_state.products.list(&branch).await?;
    Ok(Json(product_service::list_view(&records, &query)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = ProductDraft,
    params(("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Json(payload): Json<ProductDraft>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let record = app_state.products.add(&branch, payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    tag = "Products",
    request_body = ProductPatch,
    params(("id" = Uuid, Path, description = "Product id"), ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 404, description = "Unknown product")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductPatch>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.products.edit(&branch, id, payload).await?))
}

// Apagar o produto também apaga as fotos do disco
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id"), ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses(
        (status = 200, description = "Product deleted", body = Product),
        (status = 403, description = "Super admin only")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let removed = app_state
        .media
        .delete_record(&session.access, &app_state.products, &branch, id)
        .await?;
    Ok(Json(removed))
}

// ---
// Anexos de mídia
// ---
#[utoipa::path(
    post,
    path = "/api/products/{id}/media",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id"), ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "Admitted files and per-file errors", body = MediaUploadResponse)),
    security(("api_jwt" = []))
)]
pub async fn upload_product_media(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let files = read_files(multipart).await?;
    let response = app_state.media.attach(&app_state.products, &branch, id, files).await?;
    Ok(Json(response))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/media/{media_id}",
    tag = "Products",
    request_body = AltTextPayload,
    params(
        ("id" = Uuid, Path, description = "Product id"),
        ("media_id" = Uuid, Path, description = "Attachment id"),
        ("x-branch-id" = Option<String>, Header, description = "Branch")
    ),
    responses((status = 200, description = "Alt text updated", body = MediaAttachment)),
    security(("api_jwt" = []))
)]
pub async fn update_product_media(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Path((id, media_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AltTextPayload>,
) -> Result<impl IntoResponse, AppError> {
    let attachment = app_state
        .media
        .update_alt_text(&app_state.products, &branch, id, media_id, payload.alt_text)
        .await?;
    Ok(Json(attachment))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/media/{media_id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product id"),
        ("media_id" = Uuid, Path, description = "Attachment id"),
        ("x-branch-id" = Option<String>, Header, description = "Branch")
    ),
    responses((status = 200, description = "Attachment removed; the updated record", body = Product)),
    security(("api_jwt" = []))
)]
pub async fn delete_product_media(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Path((id, media_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state.media.detach(&app_state.products, &branch, id, media_id).await?;
    Ok(Json(record))
}
