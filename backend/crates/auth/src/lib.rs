//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database, in-memory and OIDC implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Password login with a latency floor on every attempt
//! - Federated login through an OpenID Connect provider (authorization code flow)
//! - Server-side sessions with HMAC-signed cookie tokens
//! - API users authenticated with `Authorization: token <user>:<token>`
//! - Role based permissions: global grants plus per-list grants
//!
//! ## Security Model
//! - Login nonce bound to an HttpOnly cookie, re-issued on every login page render
//! - Post-login redirects restricted to same-origin paths
//! - ID tokens verified against the provider JWKS, nonce included
//! - Client-facing errors are localized; storage and provider detail is only logged

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use application::config::{AuthConfig, OidcConfig};
pub use application::i18n::I18n;
pub use error::{AuthError, AuthResult};
pub use infra::{MemoryAuthRepository, OidcClient, PgAuthRepository};
pub use presentation::{AuthAppState, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
