// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Public ---
        handlers::health::health,
        handlers::branches::list_public_branches,
        handlers::catalog::public_services,
        handlers::catalog::public_stylists,
        handlers::appointments::list_time_slots,
        handlers::appointments::submit_booking,
        handlers::appointments::validate_booking_stage,

        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,

        // --- Session ---
        handlers::session::branches_for_select,
        handlers::session::switch_branch,

        // --- Branches ---
        handlers::branches::list_branches,
        handlers::branches::create_branch,
        handlers::branches::update_branch,
        handlers::branches::delete_branch,

        // --- Admins ---
        handlers::admins::list_admins,
        handlers::admins::get_admin,
        handlers::admins::create_admin,
        handlers::admins::update_admin,
        handlers::admins::delete_admin,
        handlers::admins::toggle_admin_status,

        // --- Appointments ---
        handlers::appointments::list_appointments,
        handlers::appointments::create_appointment,
        handlers::appointments::update_appointment,
        handlers::appointments::delete_appointment,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::export_clients,
        handlers::clients::import_clients,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::upload_product_media,
        handlers::products::update_product_media,
        handlers::products::delete_product_media,

        // --- Gallery ---
        handlers::gallery::list_gallery,
        handlers::gallery::create_gallery_item,
        handlers::gallery::update_gallery_item,
        handlers::gallery::delete_gallery_item,
        handlers::gallery::upload_gallery_item_media,
        handlers::gallery::update_gallery_item_media,
        handlers::gallery::delete_gallery_item_media,

        // --- Catalog ---
        handlers::catalog::list_services,
        handlers::catalog::create_service,
        handlers::catalog::update_service,
        handlers::catalog::delete_service,
        handlers::catalog::list_stylists,
        handlers::catalog::create_stylist,
        handlers::catalog::update_stylist,
        handlers::catalog::delete_stylist,

        // --- Notifications ---
        handlers::whatsapp::send_test_message,
    ),
    components(
        schemas(
            // --- Branches & session ---
            models::branch::BranchStatus,
            models::branch::Branch,
            models::branch::BranchDraft,
            models::branch::BranchPatch,
            models::branch::BranchOption,
            models::session::BranchAccess,
            models::session::SessionBranches,
            models::session::SwitchBranchPayload,
            models::session::SwitchBranchResponse,
            models::session::LoginResponse,

            // --- Admins ---
            models::admin::AdminRole,
            models::admin::AdminProfile,
            models::admin::AdminDraft,
            models::admin::LoginPayload,

            // --- Appointments & booking ---
            models::appointment::AppointmentStatus,
            models::appointment::BookingType,
            models::appointment::Appointment,
            models::appointment::AppointmentDraft,
            models::appointment::AppointmentPatch,
            models::appointment::DateBucket,
            models::appointment::AppointmentSort,
            models::booking::BookingRequest,
            models::booking::BookingConfirmation,
            models::booking::AppointmentRef,
            models::booking::BookingStage,
            models::booking::StageCheck,

            // --- Clients ---
            models::client::Client,
            models::client::ClientDraft,
            models::client::ClientPatch,
            models::client::ClientSort,
            models::client::RowError,
            models::client::ImportSummary,

            // --- Products, gallery, media ---
            models::product::Product,
            models::product::ProductDraft,
            models::product::ProductPatch,
            models::product::StockState,
            models::product::ProductSort,
            models::gallery::GalleryItem,
            models::gallery::GalleryDraft,
            models::gallery::GalleryPatch,
            models::gallery::GallerySort,
            models::media::MediaAttachment,
            models::media::AltTextPayload,
            models::media::MediaUploadResponse,

            // --- Catalog ---
            models::catalog::ServiceOffering,
            models::catalog::ServiceDraft,
            models::catalog::ServicePatch,
            models::catalog::Stylist,
            models::catalog::StylistDraft,
            models::catalog::StylistPatch,

            // --- Notifications ---
            services::notification::WhatsappTestPayload,
            services::notification::WhatsappTestResponse,
        )
    ),
    tags(
        (name = "Public", description = "Booking page: branches, catalog, slots and booking submit"),
        (name = "Auth", description = "Admin login and logout"),
        (name = "Session", description = "Branch context of the logged-in admin"),
        (name = "Branches", description = "Branch registry (super admin)"),
        (name = "Admins", description = "Admin directory (super admin)"),
        (name = "Appointments", description = "Appointment management per branch"),
        (name = "Clients", description = "Client records, CSV export and CSV/Excel import"),
        (name = "Products", description = "Retail products and their photos"),
        (name = "Gallery", description = "Portfolio items and their media"),
        (name = "Catalog", description = "Services and stylists per branch"),
        (name = "Notifications", description = "WhatsApp test utility")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_booking_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/appointments"));
        assert!(doc.paths.paths.contains_key("/api/appointments/validate"));
        assert!(doc.paths.paths.contains_key("/api/products/{id}/media/{media_id}"));

        let schemes = doc.components.expect("components").security_schemes;
        assert!(schemes.contains_key("api_jwt"));
    }
}
