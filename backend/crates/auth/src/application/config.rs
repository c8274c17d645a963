//! Application Configuration
//!
//! Configuration for the Auth application layer. Built once at startup and
//! shared read-only through `Arc`.

use std::collections::HashSet;
use std::time::Duration;

use platform::cookie::CookieConfig;
use url::Url;

use crate::application::i18n::I18n;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy of the session cookie
    pub cookie_same_site: SameSite,
    /// Cookie carrying the login nonce
    pub nonce_cookie_name: String,
    /// Landing page used when a login has no usable `next`
    pub admin_path: String,
    /// Upper bound on the length of any text input
    pub max_input_len: usize,
    /// Minimum duration of a password login attempt
    pub login_latency_floor: Duration,
    pub oidc: OidcConfig,
    pub provider_badges: ProviderBadges,
    pub i18n: I18n,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "session".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            nonce_cookie_name: "nonce".to_string(),
            admin_path: "/admin".to_string(),
            max_input_len: 2000,
            login_latency_floor: Duration::from_millis(100),
            oidc: OidcConfig::default(),
            provider_badges: ProviderBadges::default(),
            i18n: I18n::default(),
        }
    }
}

impl AuthConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&platform::crypto::random_bytes(32));
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    pub fn session_ttl_ms(&self) -> i64 {
        self.session_ttl.as_millis() as i64
    }

    /// Session cookie, expiring together with the server-side session
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig::named(&self.session_cookie_name)
            .secure(self.cookie_secure)
            .same_site(self.cookie_same_site)
            .max_age_secs(Some(self.session_ttl.as_secs() as i64))
    }

    /// Nonce cookie: HttpOnly, `Path=/`, `SameSite=Lax`, no expiry
    pub fn nonce_cookie(&self) -> CookieConfig {
        CookieConfig::named(&self.nonce_cookie_name)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age_secs(None)
    }

    /// `/` means "no preference" and becomes the admin landing page
    pub fn landing_or(&self, sanitized_next: String) -> String {
        if sanitized_next == "/" {
            self.admin_path.clone()
        } else {
            sanitized_next
        }
    }
}

// ============================================================================
// OIDC
// ============================================================================

/// OpenID Connect client settings
#[derive(Debug, Clone)]
pub struct OidcConfig {
    pub enabled: bool,
    /// Issuer URL; discovery reads `<provider_url>/.well-known/openid-configuration`
    pub provider_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Callback URL registered with the provider (`.../oidc/finish`)
    pub redirect_url: String,
    pub request_timeout: Duration,
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: String::new(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

// ============================================================================
// Provider badges
// ============================================================================

/// Generic badge for providers without a dedicated one
pub const GENERIC_BADGE: &str = "oidc.png";

/// Provider domains that ship their own login badge
#[derive(Debug, Clone)]
pub struct ProviderBadges {
    known: HashSet<&'static str>,
}

impl Default for ProviderBadges {
    fn default() -> Self {
        Self {
            known: ["google.com", "microsoftonline.com", "auth0.com", "github.com"]
                .into_iter()
                .collect(),
        }
    }
}

/// Provider label and badge shown on the login page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderBadge {
    pub provider: String,
    pub logo: String,
}

impl ProviderBadges {
    /// Badge for a provider URL
    ///
    /// The label is the last two DNS labels of the host (or the whole host
    /// when it has fewer). An unparsable URL gets no label and the generic
    /// badge.
    pub fn resolve(&self, provider_url: &str) -> ProviderBadge {
        let host = Url::parse(provider_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string));

        let Some(host) = host else {
            return ProviderBadge {
                provider: String::new(),
                logo: GENERIC_BADGE.to_string(),
            };
        };

        let labels: Vec<&str> = host.split('.').collect();
        let provider = if labels.len() >= 2 {
            labels[labels.len() - 2..].join(".")
        } else {
            host.clone()
        };

        let logo = if self.known.contains(provider.as_str()) {
            format!("{}.png", provider)
        } else {
            GENERIC_BADGE.to_string()
        };

        ProviderBadge { provider, logo }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.max_input_len, 2000);
        assert_eq!(config.login_latency_floor, Duration::from_millis(100));
        assert_eq!(config.session_ttl_ms(), 7 * 24 * 3600 * 1000);
        assert!(!config.oidc.enabled);
    }

    #[test]
    fn test_random_secret() {
        let a = AuthConfig::with_random_secret();
        let b = AuthConfig::with_random_secret();
        assert_ne!(a.session_secret, b.session_secret);
        assert!(!AuthConfig::development().cookie_secure);
    }

    #[test]
    fn test_nonce_cookie_shape() {
        let config = AuthConfig::development();
        assert_eq!(
            config.nonce_cookie().build_set_cookie("abc"),
            "nonce=abc; HttpOnly; SameSite=Lax; Path=/"
        );

        let secure = AuthConfig::default();
        assert!(secure.nonce_cookie().build_set_cookie("abc").contains("Secure"));
    }

    #[test]
    fn test_landing_substitution() {
        let config = AuthConfig::default();
        assert_eq!(config.landing_or("/".into()), "/admin");
        assert_eq!(config.landing_or("/admin/lists".into()), "/admin/lists");
    }

    #[test]
    fn test_known_provider_badge() {
        let badges = ProviderBadges::default();
        let badge = badges.resolve("https://accounts.google.com");
        assert_eq!(badge.provider, "google.com");
        assert_eq!(badge.logo, "google.com.png");

        let badge = badges.resolve("https://login.microsoftonline.com/tenant/v2.0");
        assert_eq!(badge.logo, "microsoftonline.com.png");
    }

    #[test]
    fn test_unknown_provider_badge() {
        let badge = ProviderBadges::default().resolve("https://sso.example.org/realms/main");
        assert_eq!(badge.provider, "example.org");
        assert_eq!(badge.logo, GENERIC_BADGE);
    }

    #[test]
    fn test_single_label_host() {
        let badge = ProviderBadges::default().resolve("http://keycloak:8080/realms/dev");
        assert_eq!(badge.provider, "keycloak");
        assert_eq!(badge.logo, GENERIC_BADGE);
    }

    #[test]
    fn test_unparsable_provider_url() {
        let badge = ProviderBadges::default().resolve("not a url");
        assert_eq!(badge.provider, "");
        assert_eq!(badge.logo, GENERIC_BADGE);
    }
}
