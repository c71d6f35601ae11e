//! Request handlers for the HTTP endpoints

pub mod auth;
pub mod cookies;
pub mod health;
pub mod problem;

// Re-export the route builders
pub use auth::{auth_routes, require_identity, with_identity, AuthApi};
pub use health::health_route;
pub use problem::handle_rejection;
