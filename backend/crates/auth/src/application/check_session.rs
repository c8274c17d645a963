//! Check Session Use Case
//!
//! Resolves the caller of a protected request: a browser presenting the
//! session cookie, or a machine identity presenting
//! `Authorization: token <username>:<api-token>`.

use std::sync::Arc;

use kernel::id::SessionId;

use crate::application::session::SessionService;
use crate::domain::entity::user::{User, UserFilter};
use crate::domain::permissions::expand;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    /// `None` for API token callers
    pub session_id: Option<SessionId>,
}

/// Check session use case
pub struct CheckSessionUseCase<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    sessions: SessionService<S>,
}

impl<U, S> CheckSessionUseCase<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, sessions: SessionService<S>) -> Self {
        Self {
            user_repo,
            sessions,
        }
    }

    /// Resolve a session cookie token to its (enabled) user
    pub async fn from_session_token(&self, token: &str) -> AuthResult<Authenticated> {
        let session = self.sessions.resolve(token).await?;

        // The user may have been deleted since the session was created
        let record = self
            .user_repo
            .fetch_users(&UserFilter::Id(session.user_id))
            .await?
            .into_iter()
            .next()
            .ok_or(AuthError::SessionInvalid)?;

        let user = expand(record);
        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        Ok(Authenticated {
            user,
            session_id: Some(session.session_id),
        })
    }

    /// Verify an `Authorization` header value of an API user
    pub async fn from_api_token(&self, header: &str) -> AuthResult<Authenticated> {
        let (username, token) =
            parse_token_header(header).ok_or(AuthError::InvalidCredentials)?;

        let record = self
            .user_repo
            .verify_api_token(username, token)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(Authenticated {
            user: expand(record),
            session_id: None,
        })
    }
}

/// Split `token <username>:<api-token>` into its two parts
pub fn parse_token_header(header: &str) -> Option<(&str, &str)> {
    let credentials = header.trim().strip_prefix("token ")?;
    let (username, token) = credentials.trim().split_once(':')?;
    let (username, token) = (username.trim(), token.trim());

    if username.is_empty() || token.is_empty() {
        return None;
    }
    Some((username, token))
}
