//! Sign Out Use Case
//!
//! Invalidates a user session.

use crate::application::session::SessionService;
use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    sessions: SessionService<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    pub fn new(sessions: SessionService<S>) -> Self {
        Self { sessions }
    }

    /// Sign out from current session
    pub async fn execute(&self, session_token: &str) -> AuthResult<()> {
        self.sessions.destroy_session(session_token).await?;
        tracing::info!("User signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::application::config::AuthConfig;
    use crate::error::AuthError;
    use crate::test_support::{fixtures, store};

    #[tokio::test]
    async fn test_sign_out() {
        let repo = Arc::new(store());
        let sessions = SessionService::new(repo.clone(), Arc::new(AuthConfig::development()));
        let token = sessions
            .create_session(&fixtures::admin_user(), None)
            .await
            .unwrap();
        assert_eq!(repo.session_count(), 1);

        let sign_out = SignOutUseCase::new(sessions);
        sign_out.execute(&token).await.unwrap();
        assert_eq!(repo.session_count(), 0);

        // Already gone
        sign_out.execute(&token).await.unwrap();
        assert!(matches!(
            sign_out.execute("forged.token").await,
            Err(AuthError::SessionInvalid)
        ));
    }
}
