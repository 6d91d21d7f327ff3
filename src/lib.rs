pub mod api;
pub mod attendance;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod preferences;
pub mod receipt;
pub mod stub;
