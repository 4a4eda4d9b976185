pub mod auth;
pub mod branch;
