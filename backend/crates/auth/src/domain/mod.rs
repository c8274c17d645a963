//! Domain Layer
//!
//! Entities, value objects, the authorization model, and the traits the
//! application layer talks to (credential store, session storage, identity
//! provider).

pub mod entity;
pub mod permissions;
pub mod provider;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{auth_session::AuthSession, identity::IdentityClaims, user::User};
pub use provider::IdentityProvider;
pub use repository::{SessionRepository, UserRepository};
