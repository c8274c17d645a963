//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the
//! infrastructure layer.

use kernel::id::SessionId;
use platform::password::ClearTextPassword;

use crate::domain::entity::{
    auth_session::AuthSession,
    user::{NewUser, ProfileUpdate, UserFilter, UserRecord, UserUpdate},
};
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

/// Credential store: users joined with their roles
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Users matching `filter`, ordered by id
    async fn fetch_users(&self, filter: &UserFilter) -> AuthResult<Vec<UserRecord>>;

    /// Enabled password-login user with this username and password
    ///
    /// `None` covers both an unknown username and a wrong password.
    async fn verify_password(
        &self,
        username: &str,
        password: &ClearTextPassword,
    ) -> AuthResult<Option<UserRecord>>;

    /// Enabled API user with this username and token
    async fn verify_api_token(&self, username: &str, token: &str)
    -> AuthResult<Option<UserRecord>>;

    /// Stamp the login time; a non-empty `avatar` replaces the stored one
    async fn update_last_login(&self, user_id: UserId, avatar: Option<&str>) -> AuthResult<()>;

    /// Insert a user; `AuthError::UserNameTaken` on a duplicate username or e-mail
    async fn create_user(&self, user: &NewUser) -> AuthResult<UserId>;

    /// Rows affected
    async fn update_user(&self, user_id: UserId, update: &UserUpdate) -> AuthResult<u64>;

    /// Rows affected; API users are never matched
    async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> AuthResult<u64>;

    /// Rows affected
    async fn delete_users(&self, ids: &[UserId]) -> AuthResult<u64>;
}

/// Auth session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn create_session(&self, session: &AuthSession) -> AuthResult<()>;

    async fn find_session(&self, session_id: SessionId) -> AuthResult<Option<AuthSession>>;

    /// Update session (e.g., last activity)
    async fn update_session(&self, session: &AuthSession) -> AuthResult<()>;

    async fn delete_session(&self, session_id: SessionId) -> AuthResult<()>;

    /// Delete all sessions of a user; returns how many went away
    async fn delete_user_sessions(&self, user_id: UserId) -> AuthResult<u64>;

    /// Clean up expired sessions
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
