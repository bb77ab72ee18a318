//! Data models for the session API.

pub mod auth;

pub use auth::{LoginResponse, RefreshResponse, Role, User};
