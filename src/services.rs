pub mod record_store;
pub use record_store::RecordStore;
pub mod appointment_service;
pub mod client_service;
pub use client_service::ClientService;
pub mod product_service;
pub mod gallery_service;
pub mod catalog_service;
pub mod branch_service;
pub use branch_service::{BranchRegistry, SessionService};
pub mod admin_service;
pub use admin_service::AdminDirectory;
pub mod auth;
pub use auth::AuthService;
pub mod notification;
pub mod media_service;
pub use media_service::MediaService;
pub mod booking_service;
pub use booking_service::BookingService;
