//! Environment Configuration
//!
//! Reads the process environment (after `.env` is loaded) into the auth
//! configuration and the server settings.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, bail};
use auth::{AuthConfig, I18n, OidcConfig};
use base64::Engine;
use base64::engine::general_purpose;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:31113";

/// Server settings outside the auth configuration
pub struct ServerConfig {
    /// `None` runs on the in-memory store (debug builds only)
    pub database_url: Option<String>,
    pub listen_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        if database_url.is_none() && !cfg!(debug_assertions) {
            bail!("DATABASE_URL must be set in environment");
        }

        let listen_addr = env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("LISTEN_ADDR is not a socket address")?;

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            database_url,
            listen_addr,
            frontend_origins,
        })
    }
}

/// Auth configuration from the environment
///
/// Debug builds fall back to a random session secret and insecure cookies.
pub fn auth_config_from_env() -> anyhow::Result<AuthConfig> {
    let mut config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig::default()
    };

    match env::var("AUTH_SESSION_SECRET") {
        Ok(secret_b64) => {
            let secret_bytes = general_purpose::STANDARD
                .decode(secret_b64.trim())
                .context("AUTH_SESSION_SECRET is not valid base64")?;
            config.session_secret = secret_bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("AUTH_SESSION_SECRET must decode to 32 bytes"))?;
        }
        Err(_) if cfg!(debug_assertions) => {}
        Err(_) => bail!("AUTH_SESSION_SECRET must be set in production"),
    }

    if let Ok(path) = env::var("AUTH_ADMIN_PATH") {
        config.admin_path = path;
    }
    if let Some(secure) = env_bool("AUTH_COOKIE_SECURE") {
        config.cookie_secure = secure;
    }

    config.oidc = OidcConfig {
        enabled: env_bool("OIDC_ENABLED").unwrap_or(false),
        provider_url: env::var("OIDC_PROVIDER_URL").unwrap_or_default(),
        client_id: env::var("OIDC_CLIENT_ID").unwrap_or_default(),
        client_secret: env::var("OIDC_CLIENT_SECRET").unwrap_or_default(),
        redirect_url: env::var("OIDC_REDIRECT_URL").unwrap_or_default(),
        ..OidcConfig::default()
    };

    if let Ok(path) = env::var("I18N_FILE") {
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read I18N_FILE {path}"))?;
        config.i18n = I18n::with_overrides(&json).context("I18N_FILE is not a JSON object")?;
    }

    Ok(config)
}

fn env_bool(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}
