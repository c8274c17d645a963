//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod memory;
pub mod oidc;
pub mod postgres;

pub use memory::MemoryAuthRepository;
pub use oidc::{OidcClient, ProviderMetadata};
pub use postgres::PgAuthRepository;
