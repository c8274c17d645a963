//! Verified claims from an OpenID Connect provider

/// Claims the login flow relies on, taken from a verified ID token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    pub email: String,
    /// Avatar URL, copied onto the user on every login
    pub picture: Option<String>,
}
