pub mod record;
pub mod branch;
pub mod admin;
pub mod session;
pub mod media;
pub mod appointment;
pub mod client;
pub mod product;
pub mod gallery;
pub mod catalog;
pub mod booking;
