//! In-Memory Repository Implementation
//!
//! Process-local credential and session store for development runs and
//! tests. Behaves like the PostgreSQL store: unique usernames and e-mails,
//! role references checked, sessions removed together with their user.
//! Passwords are Argon2id hashes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::SessionId;
use parking_lot::RwLock;
use platform::password::{ClearTextPassword, HashedPassword};

use crate::domain::entity::{
    auth_session::AuthSession,
    user::{ListPermission, NewUser, ProfileUpdate, UserFilter, UserRecord, UserUpdate},
};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    user_id::{RoleId, UserId},
    user_status::UserStatus,
    user_type::UserType,
};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone)]
struct StoredUser {
    username: String,
    name: String,
    email: String,
    user_type: UserType,
    password_login: bool,
    password_hash: Option<String>,
    status: UserStatus,
    avatar: Option<String>,
    loggedin_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    role_id: RoleId,
}

#[derive(Debug, Clone)]
struct StoredRole {
    name: String,
    permissions: Vec<String>,
    lists: Vec<ListPermission>,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<i32, StoredUser>,
    roles: HashMap<i32, StoredRole>,
    sessions: HashMap<SessionId, AuthSession>,
    last_user_id: i32,
}

impl State {
    fn record(&self, id: i32, user: &StoredUser) -> AuthResult<UserRecord> {
        let role = self
            .roles
            .get(&user.role_id.get())
            .ok_or_else(|| AuthError::Internal(format!("user {id} references a missing role")))?;

        // Same shape the SQL view aggregates into
        let lists = serde_json::to_string(&role.lists)
            .map_err(|e| AuthError::Internal(format!("Failed to encode list grants: {e}")))?;

        Ok(UserRecord {
            id: UserId::new(id),
            username: user.username.clone(),
            name: user.name.clone(),
            email: Some(user.email.clone()),
            user_type: user.user_type,
            password_login: user.password_login,
            password_hash: user.password_hash.clone(),
            status: user.status,
            avatar: user.avatar.clone(),
            loggedin_at: user.loggedin_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
            role_id: user.role_id,
            role_name: role.name.clone(),
            role_permissions: role.permissions.clone(),
            list_permissions_raw: Some(lists),
        })
    }

    /// Reject a username or e-mail already used by another user
    fn check_unique(&self, username: &str, email: &str, except: Option<i32>) -> AuthResult<()> {
        let taken = self.users.iter().any(|(id, u)| {
            Some(*id) != except
                && (u.username == username || u.email.eq_ignore_ascii_case(email))
        });
        if taken {
            return Err(AuthError::UserNameTaken);
        }
        Ok(())
    }

    fn check_role(&self, role_id: RoleId) -> AuthResult<()> {
        if !self.roles.contains_key(&role_id.get()) {
            return Err(AuthError::InvalidInput("role"));
        }
        Ok(())
    }
}

/// In-memory auth repository
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthRepository {
    inner: Arc<RwLock<State>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a role
    pub fn insert_role(
        &self,
        role_id: RoleId,
        name: impl Into<String>,
        permissions: &[&str],
        lists: Vec<ListPermission>,
    ) {
        self.inner.write().roles.insert(
            role_id.get(),
            StoredRole {
                name: name.into(),
                permissions: permissions.iter().map(|p| p.to_string()).collect(),
                lists,
            },
        );
    }

    /// Insert a user whose credential is already hashed
    ///
    /// `user.password` is ignored; `password_hash` is stored as given.
    pub fn insert_user_with_hash(
        &self,
        user: &NewUser,
        password_hash: Option<String>,
    ) -> AuthResult<UserId> {
        let mut state = self.inner.write();
        state.check_unique(&user.username, &user.email, None)?;
        state.check_role(user.role_id)?;

        state.last_user_id += 1;
        let id = state.last_user_id;
        let now = Utc::now();

        state.users.insert(
            id,
            StoredUser {
                username: user.username.clone(),
                name: user.name.clone(),
                email: user.email.to_lowercase(),
                user_type: user.user_type,
                password_login: user.password_login,
                password_hash,
                status: user.status,
                avatar: None,
                loggedin_at: None,
                created_at: now,
                updated_at: now,
                role_id: user.role_id,
            },
        );

        Ok(UserId::new(id))
    }

    pub fn session_count(&self) -> usize {
        self.inner.read().sessions.len()
    }

    /// Find a user matching `pred` and check `secret` against its hash
    async fn verify_secret(
        &self,
        secret: &str,
        pred: impl Fn(&StoredUser) -> bool,
    ) -> AuthResult<Option<UserRecord>> {
        let candidate = {
            let state = self.inner.read();
            state
                .users
                .iter()
                .find(|(_, u)| pred(u))
                .map(|(id, u)| (*id, u.password_hash.clone()))
        };

        let Some((id, Some(hash))) = candidate else {
            return Ok(None);
        };

        let hash = HashedPassword::from_phc_string(hash)?;
        if !hash.verify_blocking(ClearTextPassword::new(secret)).await? {
            return Ok(None);
        }

        let state = self.inner.read();
        state
            .users
            .get(&id)
            .map(|u| state.record(id, u))
            .transpose()
    }
}

async fn hash_password(password: Option<&ClearTextPassword>) -> AuthResult<Option<String>> {
    match password.filter(|p| !p.is_empty()) {
        Some(password) => {
            let hashed = ClearTextPassword::new(password.as_str())
                .hash_blocking()
                .await?;
            Ok(Some(hashed.as_phc_string().to_string()))
        }
        None => Ok(None),
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for MemoryAuthRepository {
    async fn fetch_users(&self, filter: &UserFilter) -> AuthResult<Vec<UserRecord>> {
        let state = self.inner.read();

        state
            .users
            .iter()
            .filter(|(id, u)| match filter {
                UserFilter::All => true,
                UserFilter::Id(user_id) => **id == user_id.get(),
                UserFilter::Username(username) => u.username == *username,
                UserFilter::Email(email) => u.email.eq_ignore_ascii_case(email),
            })
            .map(|(id, u)| state.record(*id, u))
            .collect()
    }

    async fn verify_password(
        &self,
        username: &str,
        password: &ClearTextPassword,
    ) -> AuthResult<Option<UserRecord>> {
        self.verify_secret(password.as_str(), |u| {
            u.username == username
                && u.user_type == UserType::User
                && u.password_login
                && u.status.can_login()
        })
        .await
    }

    async fn verify_api_token(
        &self,
        username: &str,
        token: &str,
    ) -> AuthResult<Option<UserRecord>> {
        self.verify_secret(token, |u| {
            u.username == username && u.user_type == UserType::Api && u.status.can_login()
        })
        .await
    }

    async fn update_last_login(&self, user_id: UserId, avatar: Option<&str>) -> AuthResult<()> {
        let mut state = self.inner.write();
        if let Some(user) = state.users.get_mut(&user_id.get()) {
            user.loggedin_at = Some(Utc::now());
            if let Some(avatar) = avatar.filter(|a| !a.is_empty()) {
                user.avatar = Some(avatar.to_string());
            }
        }
        Ok(())
    }

    async fn create_user(&self, user: &NewUser) -> AuthResult<UserId> {
        let password_hash = hash_password(user.password.as_ref()).await?;
        self.insert_user_with_hash(user, password_hash)
    }

    async fn update_user(&self, user_id: UserId, update: &UserUpdate) -> AuthResult<u64> {
        let password_hash = hash_password(update.password.as_ref()).await?;

        let mut state = self.inner.write();
        if !state.users.contains_key(&user_id.get()) {
            return Ok(0);
        }
        state.check_unique(&update.username, &update.email, Some(user_id.get()))?;
        state.check_role(update.role_id)?;

        let Some(user) = state.users.get_mut(&user_id.get()) else {
            return Ok(0);
        };
        user.username = update.username.clone();
        user.name = update.name.clone();
        user.email = update.email.to_lowercase();
        user.password_login = update.password_login;
        if password_hash.is_some() {
            user.password_hash = password_hash;
        }
        user.role_id = update.role_id;
        user.status = update.status;
        user.updated_at = Utc::now();

        Ok(1)
    }

    async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> AuthResult<u64> {
        let password_hash = hash_password(update.password.as_ref()).await?;

        let mut state = self.inner.write();
        let Some(current) = state
            .users
            .get(&user_id.get())
            .filter(|u| u.user_type == UserType::User)
        else {
            return Ok(0);
        };

        if let Some(email) = &update.email {
            let username = current.username.clone();
            state.check_unique(&username, email, Some(user_id.get()))?;
        }

        let Some(user) = state.users.get_mut(&user_id.get()) else {
            return Ok(0);
        };
        user.name = update.name.clone();
        if let Some(email) = &update.email {
            user.email = email.to_lowercase();
        }
        if password_hash.is_some() {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();

        Ok(1)
    }

    async fn delete_users(&self, ids: &[UserId]) -> AuthResult<u64> {
        let mut state = self.inner.write();

        let mut deleted = 0;
        for id in ids {
            if state.users.remove(&id.get()).is_some() {
                deleted += 1;
            }
        }
        state
            .sessions
            .retain(|_, session| !ids.contains(&session.user_id));

        Ok(deleted)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for MemoryAuthRepository {
    async fn create_session(&self, session: &AuthSession) -> AuthResult<()> {
        self.inner
            .write()
            .sessions
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: SessionId) -> AuthResult<Option<AuthSession>> {
        Ok(self.inner.read().sessions.get(&session_id).cloned())
    }

    async fn update_session(&self, session: &AuthSession) -> AuthResult<()> {
        if let Some(stored) = self.inner.write().sessions.get_mut(&session.session_id) {
            stored.expires_at_ms = session.expires_at_ms;
            stored.last_activity_at = session.last_activity_at;
        }
        Ok(())
    }

    async fn delete_session(&self, session_id: SessionId) -> AuthResult<()> {
        self.inner.write().sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: UserId) -> AuthResult<u64> {
        let mut state = self.inner.write();
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut state = self.inner.write();
        let before = state.sessions.len();
        state.sessions.retain(|_, s| !s.is_expired());
        let deleted = (before - state.sessions.len()) as u64;

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");
        Ok(deleted)
    }
}
