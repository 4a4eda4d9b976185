// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, middleware::auth::auth_guard};

/// Request lenta é cortada com 408.
fn request_timeout_layer(timeout: std::time::Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

pub fn build_router(app_state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(app_state.settings.upload_body_limit());

    // --- ROTAS PÚBLICAS (site de agendamento e login) ---
    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/public/branches", get(handlers::branches::list_public_branches))
        .route("/api/catalog/time-slots", get(handlers::appointments::list_time_slots))
        .route("/api/catalog/{branch}/services", get(handlers::catalog::public_services))
        .route("/api/catalog/{branch}/stylists", get(handlers::catalog::public_stylists))
        .route("/api/appointments", post(handlers::appointments::submit_booking))
        .route(
            "/api/appointments/validate",
            post(handlers::appointments::validate_booking_stage),
        )
        .route("/api/admin/login", post(handlers::auth::login));

    // --- ROTAS DE ADMIN (sessão, filiais, diretório) ---
    let admin_routes = Router::new()
        .route("/api/admin/logout", post(handlers::auth::logout))
        .route("/api/admin/me", get(handlers::auth::me))
        .route("/api/session/branches", get(handlers::session::branches_for_select))
        .route("/api/session/branch", post(handlers::session::switch_branch))
        .route(
            "/api/branches",
            get(handlers::branches::list_branches).post(handlers::branches::create_branch),
        )
        .route(
            "/api/branches/{id}",
            patch(handlers::branches::update_branch).delete(handlers::branches::delete_branch),
        )
        .route(
            "/api/admins",
            get(handlers::admins::list_admins).post(handlers::admins::create_admin),
        )
        .route(
            "/api/admins/{id}",
            get(handlers::admins::get_admin)
                .patch(handlers::admins::update_admin)
                .delete(handlers::admins::delete_admin),
        )
        .route("/api/admins/{id}/toggle-status", post(handlers::admins::toggle_admin_status))
        .route("/api/whatsapp/test", post(handlers::whatsapp::send_test_message));

    // --- ROTAS POR FILIAL (x-branch-id ou a filial atual da sessão) ---
    let branch_routes = Router::new()
        .route(
            "/api/admin/appointments",
            get(handlers::appointments::list_appointments).post(handlers::appointments::create_appointment),
        )
        .route(
            "/api/admin/appointments/{id}",
            patch(handlers::appointments::update_appointment).delete(handlers::appointments::delete_appointment),
        )
        .route(
            "/api/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route("/api/clients/export", get(handlers::clients::export_clients))
        .route(
            "/api/clients/import",
            post(handlers::clients::import_clients).layer(upload_limit.clone()),
        )
        .route(
            "/api/clients/{id}",
            patch(handlers::clients::update_client).delete(handlers::clients::delete_client),
        )
        .route(
            "/api/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/api/products/{id}",
            patch(handlers::products::update_product).delete(handlers::products::delete_product),
        )
        .route(
            "/api/products/{id}/media",
            post(handlers::products::upload_product_media).layer(upload_limit.clone()),
        )
        .route(
            "/api/products/{id}/media/{media_id}",
            patch(handlers::products::update_product_media).delete(handlers::products::delete_product_media),
        )
        .route(
            "/api/gallery",
            get(handlers::gallery::list_gallery).post(handlers::gallery::create_gallery_item),
        )
        .route(
            "/api/gallery/{id}",
            patch(handlers::gallery::update_gallery_item).delete(handlers::gallery::delete_gallery_item),
        )
        .route(
            "/api/gallery/{id}/media",
            post(handlers::gallery::upload_gallery_item_media).layer(upload_limit),
        )
        .route(
            "/api/gallery/{id}/media/{media_id}",
            patch(handlers::gallery::update_gallery_item_media)
                .delete(handlers::gallery::delete_gallery_item_media),
        )
        .route(
            "/api/services",
            get(handlers::catalog::list_services).post(handlers::catalog::create_service),
        )
        .route(
            "/api/services/{id}",
            patch(handlers::catalog::update_service).delete(handlers::catalog::delete_service),
        )
        .route(
            "/api/stylists",
            get(handlers::catalog::list_stylists).post(handlers::catalog::create_stylist),
        )
        .route(
            "/api/stylists/{id}",
            patch(handlers::catalog::update_stylist).delete(handlers::catalog::delete_stylist),
        );

    let protected_routes = admin_routes
        .merge(branch_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let media_dir = app_state.settings.media_dir.clone();
    let request_timeout = app_state.settings.request_timeout;

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/media", ServeDir::new(media_dir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(request_timeout_layer(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
