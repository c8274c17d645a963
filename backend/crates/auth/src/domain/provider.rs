//! Federated Identity Provider
//!
//! The OIDC client behind the federated login flow. The nonce travels with
//! both calls so the provider can bind the ID token to this login attempt.

use crate::domain::entity::identity::IdentityClaims;
use crate::error::AuthResult;

#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Provider URL to send the browser to
    ///
    /// `next` comes back unchanged as the `state` query parameter.
    fn authorization_url(&self, next: &str, nonce: &str) -> String;

    /// Exchange an authorization code for `(id_token, claims)`
    ///
    /// Every failure (transport, timeout, rejected code, bad signature,
    /// nonce mismatch) is reported as `AuthError::IdentityExchangeFailed`.
    async fn exchange_code(&self, code: &str, nonce: &str)
    -> AuthResult<(String, IdentityClaims)>;
}
