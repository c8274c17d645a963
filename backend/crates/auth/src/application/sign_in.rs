//! Password Sign In Use Case
//!
//! Verifies a username/password pair against the credential store and opens
//! a session. Every attempt, successful or not, takes at least the configured
//! latency floor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use platform::password::ClearTextPassword;
use platform::text::has_len;

use crate::application::config::AuthConfig;
use crate::application::session::SessionService;
use crate::domain::entity::user::User;
use crate::domain::permissions::expand;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Minimum username length
pub const USERNAME_MIN_LEN: usize = 3;
/// Minimum password length
pub const PASSWORD_MIN_LEN: usize = 8;

/// Sign in input
pub struct SignInInput {
    pub username: String,
    pub password: String,
}

/// Sign in output
pub struct SignInOutput {
    /// Session token for cookie
    pub session_token: String,
    pub user: User,
}

/// Password sign in use case
pub struct SignInUseCase<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    sessions: SessionService<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> SignInUseCase<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, sessions: SessionService<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            sessions,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let username = input.username.trim();
        let password = input.password.trim();

        if !has_len(username, USERNAME_MIN_LEN, self.config.max_input_len) {
            return Err(AuthError::InvalidInput("username"));
        }
        if !has_len(password, PASSWORD_MIN_LEN, self.config.max_input_len) {
            return Err(AuthError::InvalidInput("password"));
        }

        let password = ClearTextPassword::new(password);

        let started = Instant::now();
        let verified = self.user_repo.verify_password(username, &password).await;
        pad_latency(started.elapsed(), self.config.login_latency_floor).await;

        let record = verified?.ok_or(AuthError::InvalidCredentials)?;
        let user = expand(record);

        if let Err(e) = self.user_repo.update_last_login(user.id, None).await {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to record login time");
        }

        let session_token = self.sessions.create_session(&user, None).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User signed in");

        Ok(SignInOutput {
            session_token,
            user,
        })
    }
}

/// Sleep so that a call which took `elapsed` ends no sooner than `floor`
///
/// Fast calls are stretched by `max(elapsed, floor - elapsed)`, so a
/// response never returns before the floor and a slower lookup stays
/// proportionally slower.
pub(crate) async fn pad_latency(elapsed: Duration, floor: Duration) {
    if elapsed < floor {
        tokio::time::sleep(elapsed.max(floor - elapsed)).await;
    }
}
