//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod admin;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{CurrentUser, ensure_permission, require_auth};
pub use router::auth_router;
