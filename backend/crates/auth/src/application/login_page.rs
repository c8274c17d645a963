//! Login Page Use Case
//!
//! Builds the login view model. Every render issues a fresh nonce, which the
//! handler binds to the `nonce` cookie.

use std::sync::Arc;

use platform::crypto::random_string;
use platform::uri::sanitize_uri;
use serde::Serialize;

use crate::application::config::AuthConfig;

/// Length of the login nonce
pub const NONCE_LEN: usize = 16;

/// Login page view model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    pub title: String,
    pub next_uri: String,
    pub nonce: String,
    pub password_enabled: bool,
    /// Provider domain; `None` hides the federated login button
    pub oidc_provider: Option<String>,
    pub oidc_provider_logo: Option<String>,
    pub error: Option<String>,
}

/// Login page use case
pub struct LoginPageUseCase {
    config: Arc<AuthConfig>,
}

impl LoginPageUseCase {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    /// Build the view for `next`, optionally carrying a localized error
    pub fn execute(&self, next: &str, error: Option<String>) -> LoginView {
        let next_uri = self.config.landing_or(sanitize_uri(next));

        let (oidc_provider, oidc_provider_logo) = if self.config.oidc.enabled {
            let badge = self
                .config
                .provider_badges
                .resolve(&self.config.oidc.provider_url);
            (Some(badge.provider), Some(badge.logo))
        } else {
            (None, None)
        };

        LoginView {
            title: self.config.i18n.t("users.login"),
            next_uri,
            nonce: random_string(NONCE_LEN),
            password_enabled: true,
            oidc_provider,
            oidc_provider_logo,
            error,
        }
    }
}
