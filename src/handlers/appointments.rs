// src/handlers/appointments.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Local;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::CurrentAdmin, branch::BranchScope},
    models::{
        appointment::{Appointment, AppointmentDraft, AppointmentPatch, AppointmentQuery},
        booking::{time_slots, BookingConfirmation, BookingRequest, StageCheck, StageQuery},
    },
    services::appointment_service,
};

// ---
// Agendamento público (site)
// ---
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Public",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Booking received", body = BookingConfirmation),
        (status = 400, description = "Per-field validation errors"),
        (status = 409, description = "Slot already taken for the chosen stylist")
    )
)]
pub async fn submit_booking(
    State(app_state): State<AppState>,
    Json(payload): Json<BookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let confirmation = app_state.booking.submit(payload, today).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

// Valida uma etapa do formulário antes de avançar (mesmas regras do envio)
#[utoipa::path(
    post,
    path = "/api/appointments/validate",
    tag = "Public",
    params(StageQuery),
    request_body = BookingRequest,
    responses(
        (status = 200, description = "Stage is complete", body = StageCheck),
        (status = 400, description = "Per-field validation errors for this stage")
    )
)]
pub async fn validate_booking_stage(
    Query(query): Query<StageQuery>,
    Json(payload): Json<BookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let check = payload.check_stage(today, query.stage)?;
    Ok(Json(check))
}

#[utoipa::path(
    get,
    path = "/api/catalog/time-slots",
    tag = "Public",
    responses((status = 200, description = "Bookable half-hour slots", body = Vec<String>))
)]
pub async fn list_time_slots() -> impl IntoResponse {
    let slots: Vec<String> = time_slots().iter().map(|t| t.format("%H:%M").to_string()).collect();
    Json(slots)
}

// ---
// Gestão por filial
// ---
#[utoipa::path(
    get,
    path = "/api/admin/appointments",
    tag = "Appointments",
    params(
        AppointmentQuery,
        ("x-branch-id" = Option<String>, Header, description = "Branch; defaults to the session's current branch")
    ),
    responses(
        (status = 200, description = "Filtered and sorted appointments", body = Vec<Appointment>),
        (status = 403, description = "Branch outside the admin's access")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_appointments(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Query(query): Query<AppointmentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let records = app_state.appointments.list(&branch).await?;
    let today = Local::now().date_naive();
    Ok(Json(appointment_service::list_view(&records, &query, today)))
}

#[utoipa::path(
    post,
    path = "/api/admin/appointments",
    tag = "Appointments",
    request_body = AppointmentDraft,
    params(("x-branch-id" = Option<String>, Header, description = "Branch")),
    responses(
        (status = 201, description = "Appointment created", body = Appointment),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_appointment(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Json(payload): Json<AppointmentDraft>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let appointment = app_state.appointments.add(&branch, payload).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/appointments/{id}",
    tag = "Appointments",
    request_body = AppointmentPatch,
    params(
        ("id" = Uuid, Path, description = "Appointment id"),
        ("x-branch-id" = Option<String>, Header, description = "Branch")
    ),
    responses(
        (status = 200, description = "Appointment updated", body = Appointment),
        (status = 404, description = "Unknown appointment")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_appointment(
    State(app_state): State<AppState>,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
    Json(payload): Json<AppointmentPatch>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.appointments.edit(&branch, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/appointments/{id}",
    tag = "Appointments",
    params(
        ("id" = Uuid, Path, description = "Appointment id"),
        ("x-branch-id" = Option<String>, Header, description = "Branch")
    ),
    responses(
        (status = 200, description = "Appointment deleted", body = Appointment),
        (status = 403, description = "Super admin only")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_appointment(
    State(app_state): State<AppState>,
    CurrentAdmin(session): CurrentAdmin,
    BranchScope(branch): BranchScope,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.appointments.delete(&session.access, &branch, id).await?))
}
