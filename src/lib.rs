//! Resto Auth - cookie/header JWT authentication for a multi-tenant restaurant backend
//!
//! This library provides registration with restaurant provisioning, credential
//! login, access/refresh token issuance with single-session refresh rotation,
//! logout, and per-request authentication.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod storage;
pub mod tenant;

// Re-export main components
pub use config::*;
pub use constants::*;
