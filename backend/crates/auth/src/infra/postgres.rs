//! PostgreSQL Repository Implementations
//!
//! Users are read through the `user_records` view, which joins each user
//! with its role and aggregates the role's list grants into JSON text.
//! Credentials are hashed and compared in SQL with pgcrypto `crypt()`.

use chrono::{DateTime, Utc};
use kernel::id::SessionId;
use platform::password::ClearTextPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    auth_session::AuthSession,
    user::{NewUser, ProfileUpdate, UserFilter, UserRecord, UserUpdate},
};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    user_id::{RoleId, UserId},
    user_status::UserStatus,
    user_type::UserType,
};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = r#"
    id,
    username,
    name,
    email,
    user_type,
    password_login,
    password_hash,
    status,
    avatar,
    loggedin_at,
    created_at,
    updated_at,
    role_id,
    role_name,
    role_permissions,
    list_permissions_raw
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired sessions
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }

    async fn verify_secret(
        &self,
        username: &str,
        secret: &str,
        user_type: UserType,
        password_login_only: bool,
    ) -> AuthResult<Option<UserRecord>> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM user_records
            WHERE username = $1
              AND user_type = $2
              AND status = 'enabled'
              AND ($3 = FALSE OR password_login = TRUE)
              AND password_hash IS NOT NULL
              AND password_hash = crypt($4, password_hash)
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .bind(user_type.code())
            .bind(password_login_only)
            .bind(secret)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_record()).transpose()
    }
}

/// Map constraint violations to domain errors
fn map_write_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AuthError::UserNameTaken;
        }
        if db.is_foreign_key_violation() {
            return AuthError::InvalidInput("role");
        }
        if db.is_check_violation() {
            return AuthError::InvalidInput("status");
        }
    }
    AuthError::Database(err)
}

fn password_param(password: Option<&ClearTextPassword>) -> &str {
    password.map(ClearTextPassword::as_str).unwrap_or_default()
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn fetch_users(&self, filter: &UserFilter) -> AuthResult<Vec<UserRecord>> {
        let (id, username, email) = match filter {
            UserFilter::All => (0, "", ""),
            UserFilter::Id(id) => (id.get(), "", ""),
            UserFilter::Username(username) => (0, username.as_str(), ""),
            UserFilter::Email(email) => (0, "", email.as_str()),
        };

        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM user_records
            WHERE ($1 = 0 OR id = $1)
              AND ($2 = '' OR username = $2)
              AND ($3 = '' OR LOWER(email) = LOWER($3))
            ORDER BY id
            "#
        );

        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(username)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.into_record()).collect()
    }

    async fn verify_password(
        &self,
        username: &str,
        password: &ClearTextPassword,
    ) -> AuthResult<Option<UserRecord>> {
        self.verify_secret(username, password.as_str(), UserType::User, true)
            .await
    }

    async fn verify_api_token(
        &self,
        username: &str,
        token: &str,
    ) -> AuthResult<Option<UserRecord>> {
        self.verify_secret(username, token, UserType::Api, false)
            .await
    }

    async fn update_last_login(&self, user_id: UserId, avatar: Option<&str>) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                loggedin_at = NOW(),
                avatar = COALESCE(NULLIF($2, ''), avatar)
            WHERE id = $1
            "#,
        )
        .bind(user_id.get())
        .bind(avatar.unwrap_or_default())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create_user(&self, user: &NewUser) -> AuthResult<UserId> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO users (
                username,
                name,
                email,
                type,
                password_login,
                password,
                user_role_id,
                status
            ) VALUES (
                $1, $2, $3, $4, $5,
                CASE WHEN $6 <> '' THEN crypt($6, gen_salt('bf')) ELSE NULL END,
                $7, $8
            )
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(user.email.to_lowercase())
        .bind(user.user_type.code())
        .bind(user.password_login)
        .bind(password_param(user.password.as_ref()))
        .bind(user.role_id.get())
        .bind(user.status.code())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(UserId::new(id))
    }

    async fn update_user(&self, user_id: UserId, update: &UserUpdate) -> AuthResult<u64> {
        let affected = sqlx::query(
            r#"
            UPDATE users SET
                username = $2,
                name = $3,
                email = $4,
                password_login = $5,
                password = CASE WHEN $6 <> '' THEN crypt($6, gen_salt('bf')) ELSE password END,
                user_role_id = $7,
                status = $8,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id.get())
        .bind(&update.username)
        .bind(&update.name)
        .bind(update.email.to_lowercase())
        .bind(update.password_login)
        .bind(password_param(update.password.as_ref()))
        .bind(update.role_id.get())
        .bind(update.status.code())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?
        .rows_affected();

        Ok(affected)
    }

    async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> AuthResult<u64> {
        let affected = sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                email = COALESCE(NULLIF($3, ''), email),
                password = CASE WHEN $4 <> '' THEN crypt($4, gen_salt('bf')) ELSE password END,
                updated_at = NOW()
            WHERE id = $1 AND type = 'user'
            "#,
        )
        .bind(user_id.get())
        .bind(&update.name)
        .bind(update.email.as_deref().unwrap_or_default().to_lowercase())
        .bind(password_param(update.password.as_ref()))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?
        .rows_affected();

        Ok(affected)
    }

    async fn delete_users(&self, ids: &[UserId]) -> AuthResult<u64> {
        let ids: Vec<i32> = ids.iter().map(UserId::get).collect();

        // Sessions go with the user (ON DELETE CASCADE)
        let deleted = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create_session(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                user_id,
                provider_token,
                expires_at_ms,
                created_at,
                last_activity_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.user_id.get())
        .bind(&session.provider_token)
        .bind(session.expires_at_ms)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, session_id: SessionId) -> AuthResult<Option<AuthSession>> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                provider_token,
                expires_at_ms,
                created_at,
                last_activity_at
            FROM auth_sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthSessionRow::into_session))
    }

    async fn update_session(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_sessions SET
                expires_at_ms = $2,
                last_activity_at = $3
            WHERE session_id = $1
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.expires_at_ms)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_session(&self, session_id: SessionId) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: UserId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
            .bind(user_id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        self.cleanup_expired().await
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    name: String,
    email: String,
    user_type: String,
    password_login: bool,
    password_hash: Option<String>,
    status: String,
    avatar: Option<String>,
    loggedin_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    role_id: i32,
    role_name: String,
    role_permissions: Vec<String>,
    list_permissions_raw: Option<String>,
}

impl UserRow {
    fn into_record(self) -> AuthResult<UserRecord> {
        let user_type = UserType::from_code(&self.user_type)
            .ok_or_else(|| AuthError::Internal(format!("Invalid user type: {}", self.user_type)))?;
        let status = UserStatus::from_code(&self.status)
            .ok_or_else(|| AuthError::Internal(format!("Invalid user status: {}", self.status)))?;

        Ok(UserRecord {
            id: UserId::new(self.id),
            username: self.username,
            name: self.name,
            email: Some(self.email),
            user_type,
            password_login: self.password_login,
            password_hash: self.password_hash,
            status,
            avatar: self.avatar,
            loggedin_at: self.loggedin_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            role_id: RoleId::new(self.role_id),
            role_name: self.role_name,
            role_permissions: self.role_permissions,
            list_permissions_raw: self.list_permissions_raw,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    user_id: i32,
    provider_token: Option<String>,
    expires_at_ms: i64,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthSession {
        AuthSession {
            session_id: SessionId::from_uuid(self.session_id),
            user_id: UserId::new(self.user_id),
            provider_token: self.provider_token,
            expires_at_ms: self.expires_at_ms,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        }
    }
}
