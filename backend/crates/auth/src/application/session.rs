//! Session Manager
//!
//! Creates, resolves and destroys server-side sessions. The client token is
//! `"<session uuid>.<base64url HMAC-SHA256(session uuid)>"`, so a forged or
//! mangled cookie is rejected before storage is touched.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use kernel::id::SessionId;
use sha2::Sha256;

use crate::application::config::AuthConfig;
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::SessionRepository;
use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Session manager over any session storage
pub struct SessionService<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> Clone for SessionService<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S> SessionService<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Persist a new session for `user` and return the cookie token
    pub async fn create_session(
        &self,
        user: &User,
        provider_token: Option<String>,
    ) -> AuthResult<String> {
        let ttl = chrono::Duration::from_std(self.config.session_ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid session TTL: {e}")))?;

        let session = AuthSession::new(user.id, provider_token, ttl);
        self.repo.create_session(&session).await?;

        tracing::debug!(
            user_id = %user.id,
            session_id = %session.session_id,
            federated = session.provider_token.is_some(),
            "Session created"
        );

        Ok(self.sign(session.session_id))
    }

    /// Resolve a cookie token to a live session and record activity
    pub async fn resolve(&self, token: &str) -> AuthResult<AuthSession> {
        let session_id = self.verify_token(token)?;

        let mut session = self
            .repo
            .find_session(session_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if session.is_expired() {
            self.repo.delete_session(session_id).await?;
            return Err(AuthError::SessionInvalid);
        }

        session.touch();

        // Update in background
        let session_clone = session.clone();
        let repo = self.repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.update_session(&session_clone).await {
                tracing::warn!(error = %e, "Failed to update session activity");
            }
        });

        Ok(session)
    }

    /// Delete the session behind `token`
    ///
    /// An unverifiable token is `SessionInvalid`; a verified token whose
    /// session is already gone succeeds.
    pub async fn destroy_session(&self, token: &str) -> AuthResult<()> {
        let session_id = self.verify_token(token)?;
        self.repo.delete_session(session_id).await?;
        tracing::debug!(session_id = %session_id, "Session destroyed");
        Ok(())
    }

    pub async fn destroy_user_sessions(&self, user: &User) -> AuthResult<u64> {
        self.repo.delete_user_sessions(user.id).await
    }

    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        self.repo.cleanup_expired().await
    }

    /// Generate signed session token
    fn sign(&self, session_id: SessionId) -> String {
        let session_id = session_id.to_string();
        let signature = self.mac(&session_id).finalize().into_bytes();
        format!("{}.{}", session_id, URL_SAFE_NO_PAD.encode(signature))
    }

    /// Parse and verify session token
    fn verify_token(&self, token: &str) -> AuthResult<SessionId> {
        let (session_id_str, signature_b64) =
            token.split_once('.').ok_or(AuthError::SessionInvalid)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::SessionInvalid)?;

        self.mac(session_id_str)
            .verify_slice(&signature)
            .map_err(|_| AuthError::SessionInvalid)?;

        session_id_str
            .parse()
            .map_err(|_| AuthError::SessionInvalid)
    }

    fn mac(&self, message: &str) -> HmacSha256 {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.config.session_secret)
            .expect("HMAC can take key of any size");
        mac.update(message.as_bytes());
        mac
    }
}
