//! Federated Login Use Case
//!
//! Two steps around the identity provider redirect:
//! 1. `initiate`: check the login nonce, then send the browser to the provider
//! 2. `complete`: exchange the returned code, map the verified e-mail to a
//!    local user and open a session carrying the provider token
//!
//! The nonce travels as request data (cookie + form field, or cookie +
//! provider echo) and is never stored server-side.

use std::sync::Arc;

use platform::crypto::constant_time_eq;
use platform::uri::sanitize_uri;

use crate::application::config::AuthConfig;
use crate::application::session::SessionService;
use crate::domain::entity::user::{User, UserFilter};
use crate::domain::permissions::expand;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::user_type::UserType;
use crate::error::{AuthError, AuthResult};

/// Completed federated login
pub struct FederatedLoginOutput {
    pub session_token: String,
    /// Sanitized post-login target
    pub redirect_to: String,
    pub user: User,
}

/// Federated login use case
pub struct FederatedLoginUseCase<U, S, P>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    sessions: SessionService<S>,
    provider: Option<Arc<P>>,
    config: Arc<AuthConfig>,
}

impl<U, S, P> FederatedLoginUseCase<U, S, P>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        sessions: SessionService<S>,
        provider: Option<Arc<P>>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            sessions,
            provider,
            config,
        }
    }

    /// Provider authorization URL for this login attempt
    ///
    /// The cookie nonce must be present and equal to the form nonce.
    pub fn initiate(
        &self,
        nonce_cookie: Option<&str>,
        nonce_form: &str,
        next: &str,
    ) -> AuthResult<String> {
        let nonce = nonce_cookie.unwrap_or_default();
        if nonce.is_empty() || !constant_time_eq(nonce.as_bytes(), nonce_form.as_bytes()) {
            return Err(AuthError::Unauthorized);
        }

        let provider = self.provider()?;
        let next = self.config.landing_or(sanitize_uri(next));

        tracing::debug!(next = %next, "Starting federated login");

        Ok(provider.authorization_url(&next, nonce))
    }

    /// Finish the login after the provider redirected back
    pub async fn complete(
        &self,
        nonce_cookie: Option<&str>,
        code: &str,
        state: &str,
    ) -> AuthResult<FederatedLoginOutput> {
        let nonce = nonce_cookie
            .filter(|n| !n.is_empty())
            .ok_or(AuthError::Unauthorized)?;

        let provider = self.provider()?;

        if code.is_empty() {
            return Err(AuthError::Unauthorized);
        }

        let (provider_token, claims) =
            provider
                .exchange_code(code, nonce)
                .await
                .map_err(|e| match e {
                    AuthError::IdentityExchangeFailed(_) => e,
                    other => AuthError::IdentityExchangeFailed(other.to_string()),
                })?;

        let email = claims.email.trim().to_lowercase();
        let record = self
            .user_repo
            .fetch_users(&UserFilter::Email(email))
            .await?
            .into_iter()
            .next()
            .ok_or(AuthError::UserNotFound)?;

        // Machine users only authenticate with their API token
        let user = expand(record);
        if user.user_type == UserType::Api {
            return Err(AuthError::UserNotFound);
        }
        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        self.user_repo
            .update_last_login(user.id, claims.picture.as_deref())
            .await?;

        let session_token = self
            .sessions
            .create_session(&user, Some(provider_token))
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User signed in via OIDC");

        Ok(FederatedLoginOutput {
            session_token,
            redirect_to: sanitize_uri(state),
            user,
        })
    }

    fn provider(&self) -> AuthResult<&Arc<P>> {
        match &self.provider {
            Some(provider) if self.config.oidc.enabled => Ok(provider),
            _ => Err(AuthError::InvalidInput("oidc")),
        }
    }
}
