pub mod health;
pub mod auth;
pub mod session;
pub mod branches;
pub mod admins;
pub mod appointments;
pub mod clients;
pub mod products;
pub mod gallery;
pub mod catalog;
pub mod whatsapp;
mod uploads;
