//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;
use crate::domain::value_object::{
    user_id::RoleId, user_status::UserStatus, user_type::UserType,
};

/// `{"data": ...}` envelope of every JSON success response
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Login
// ============================================================================

/// Query of `GET /login`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: String,
}

/// Form of `POST /login`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
    /// Echo of the login nonce; the password path does not check it
    #[serde(default)]
    pub nonce: String,
}

/// Form of `POST /oidc`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OidcLoginForm {
    #[serde(default)]
    pub next: String,
    #[serde(default)]
    pub nonce: String,
}

/// Query of the provider callback `GET /oidc/finish`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OidcCallbackQuery {
    #[serde(default)]
    pub code: String,
    /// Post-login target echoed back by the provider
    #[serde(default)]
    pub state: String,
}

// ============================================================================
// Users
// ============================================================================

/// Create user request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type", default)]
    pub user_type: UserType,
    #[serde(default)]
    pub password_login: bool,
    pub password: Option<String>,
    pub role_id: RoleId,
    #[serde(default)]
    pub status: UserStatus,
}

/// Update user request; a missing password keeps the current one
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password_login: bool,
    pub password: Option<String>,
    pub role_id: RoleId,
    #[serde(default)]
    pub status: UserStatus,
}

/// Profile update request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub password: Option<String>,
}

/// Created user; `apiToken` is present once, for API users only
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}
