// src/handlers/gallery.rs

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
        gallery::{GalleryItem, GalleryDraft, GalleryPatch, GalleryQuery},
    },
    services::gallery_service,
};

use super::uploads::read_files;

#[utoipa::path(
    get,
    path = "/api/gallery",
    tag = "Gallery",
    params(GalleryQuery, ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "Gallery items, newest first unless sorted otherwise", body = Vec<GalleryItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_gallery(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Query(query): Query<GalleryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let records = app_state.gallery.list(&branch).await?;
    Ok(Json(gallery_service::list_view(&records, &query)))
}

#[utoipa::path(
    post,
    path = "/api/gallery",
    tag = "Gallery",
    request_body = GalleryDraft,
    params(("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses(
        (status = 201, description = "Gallery item created", body = GalleryItem),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_gallery_item(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Json(payload): Json<GalleryDraft>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let record = app_state.gallery.add(&branch, payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    patch,
    path = "/api/gallery/{id}",
    tag = "Gallery",
    request_body = GalleryPatch,
    params(("id" = Uuid, Path, description = "Gallery item id"), ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses(
        (status = 200, description = "Gallery item updated", body = GalleryItem),
        (status = 404, description = "Unknown gallery item")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_gallery_item(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
    Json(payload): Json<GalleryPatch>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.gallery.edit(&branch, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/gallery/{id}",
    tag = "Gallery",
    params(("id" = Uuid, Path, description = "Gallery item id"), ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses(
        (status = 200, description = "Gallery item deleted", body = GalleryItem),
        (status = 403, description = "Super admin only")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_gallery_item(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let removed = app_state
        .media
        .delete_record(&session.access, &app_state.gallery, &branch, id)
        .await?;
    Ok(Json(removed))
}

// ---
// Anexos de mídia
// ---
#[utoipa::path(
    post,
    path = "/api/gallery/{id}/media",
    tag = "Gallery",
    params(("id" = Uuid, Path, description = "Gallery item id"), ("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses((status = 200, description = "Admitted files and per-file errors", body = MediaUploadResponse)),
    security(("api_jwt" = []))
)]
pub async fn upload_gallery_item_media(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let files = read_files(multipart).await?;
    let response = app_state.media.attach(&app_state.gallery, &branch, id, files).await?;
    Ok(Json(response))
}

#[utoipa::path(
    patch,
    path = "/api/gallery/{id}/media/{media_id}",
    tag = "Gallery",
    request_body = AltTextPayload,
    params(
        ("id" = Uuid, Path, description = "Gallery item id"),
        ("media_id" = Uuid, Path, description = "Attachment id"),
        ("x-branch-id" = Option<String>, Header, description = "Branch")
    ),
    responses((status = 200, description = "Alt text updated", body = MediaAttachment)),
    security(("api_jwt" = []))
)]
pub async fn update_gallery_item_media(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Path((id, media_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AltTextPayload>,
) -> Result<impl IntoResponse, AppError> {
    let attachment = app_state
        .media
        .update_alt_text(&app_state.gallery, &branch, id, media_id, payload.alt_text)
        .await?;
    Ok(Json(attachment))
}

#[utoipa::path(
    delete,
    path = "/api/gallery/{id}/media/{media_id}",
    tag = "Gallery",
    params(
        ("id" = Uuid, Path, description = "Gallery item id"),
        ("media_id" = Uuid, Path, description = "Attachment id"),
        ("x-branch-id" = Option<String>, Header, description = "Branch")
    ),
    responses((status = 200, description = "Attachment removed; the updated record", body = GalleryItem)),
    security(("api_jwt" = []))
)]
pub async fn delete_gallery_item_media(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Path((id, media_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state.media.detach(&app_state.gallery, &branch, id, media_id).await?;
    Ok(Json(record))
}
