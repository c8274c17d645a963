//! User Administration Use Case
//!
//! Listing, creating, updating and deleting accounts, plus the self-service
//! profile. Everything returned is an expanded [`User`].

use std::sync::Arc;

use platform::crypto::random_string;
use platform::password::ClearTextPassword;
use platform::text::has_len;

use crate::application::config::AuthConfig;
use crate::application::sign_in::{PASSWORD_MIN_LEN, USERNAME_MIN_LEN};
use crate::domain::entity::user::{NewUser, ProfileUpdate, User, UserFilter, UserUpdate};
use crate::domain::permissions::expand;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_id::{RoleId, UserId},
    user_status::UserStatus,
    user_type::UserType,
};
use crate::error::{AuthError, AuthResult};

/// Length of generated API tokens
pub const API_TOKEN_LEN: usize = 32;

/// Create user input
#[derive(Debug)]
pub struct CreateUserInput {
    pub username: String,
    pub name: String,
    pub email: String,
    pub user_type: UserType,
    pub password_login: bool,
    pub password: Option<String>,
    pub role_id: RoleId,
    pub status: UserStatus,
}

/// Create user output
#[derive(Debug)]
pub struct CreateUserOutput {
    pub user: User,
    /// Clear-text token of a new API user; shown exactly once
    pub api_token: Option<String>,
}

/// Update user input; an empty or absent password keeps the stored one
#[derive(Debug)]
pub struct UpdateUserInput {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password_login: bool,
    pub password: Option<String>,
    pub role_id: RoleId,
    pub status: UserStatus,
}

/// Profile update input
#[derive(Debug)]
pub struct ProfileInput {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
}

/// User administration use case
pub struct UserAdminUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> UserAdminUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn get_users(&self) -> AuthResult<Vec<User>> {
        let records = self.user_repo.fetch_users(&UserFilter::All).await?;
        Ok(records.into_iter().map(expand).collect())
    }

    /// Single user; an e-mail filter is matched in lowercase
    pub async fn get_user(&self, filter: UserFilter) -> AuthResult<User> {
        let filter = match filter {
            UserFilter::Email(email) => UserFilter::Email(email.trim().to_lowercase()),
            other => other,
        };

        self.user_repo
            .fetch_users(&filter)
            .await?
            .into_iter()
            .next()
            .map(expand)
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn create_user(&self, input: CreateUserInput) -> AuthResult<CreateUserOutput> {
        let username = self.validate_username(&input.username)?;
        let name = self.validate_name(&input.name)?;

        let (email, password_login, password, api_token) = match input.user_type {
            UserType::Api => {
                let token = random_string(API_TOKEN_LEN);
                (
                    Email::api_placeholder(&username),
                    false,
                    Some(ClearTextPassword::new(token.as_str())),
                    Some(token),
                )
            }
            UserType::User => {
                let email = Email::new(input.email)?.into_inner();
                let password = if input.password_login {
                    let password = non_empty(input.password).ok_or(AuthError::InvalidInput("password"))?;
                    Some(self.validate_password(&password)?)
                } else {
                    None
                };
                (email, input.password_login, password, None)
            }
        };

        let new_user = NewUser {
            username,
            name,
            email,
            user_type: input.user_type,
            password_login,
            password,
            role_id: input.role_id,
            status: input.status,
        };

        let user_id = self.user_repo.create_user(&new_user).await?;

        tracing::info!(
            user_id = %user_id,
            username = %new_user.username,
            user_type = %new_user.user_type,
            "User created"
        );

        let user = self.get_user(UserFilter::Id(user_id)).await?;
        Ok(CreateUserOutput { user, api_token })
    }

    pub async fn update_user(&self, user_id: UserId, input: UpdateUserInput) -> AuthResult<User> {
        let existing = self.get_user(UserFilter::Id(user_id)).await?;

        let username = self.validate_username(&input.username)?;
        let name = self.validate_name(&input.name)?;

        let update = match existing.user_type {
            // The token is only ever set at creation
            UserType::Api => UserUpdate {
                email: Email::api_placeholder(&username),
                username,
                name,
                password_login: false,
                password: None,
                role_id: input.role_id,
                status: input.status,
            },
            UserType::User => {
                let email = Email::new(input.email)?.into_inner();
                let password = match non_empty(input.password) {
                    Some(password) if input.password_login => {
                        Some(self.validate_password(&password)?)
                    }
                    None if input.password_login && !existing.has_password => {
                        return Err(AuthError::InvalidInput("password"));
                    }
                    _ => None,
                };
                UserUpdate {
                    username,
                    name,
                    email,
                    password_login: input.password_login,
                    password,
                    role_id: input.role_id,
                    status: input.status,
                }
            }
        };

        if self.user_repo.update_user(user_id, &update).await? == 0 {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, "User updated");
        self.get_user(UserFilter::Id(user_id)).await
    }

    /// Self-service update of name, e-mail and password
    pub async fn update_profile(&self, current: &User, input: ProfileInput) -> AuthResult<User> {
        let name = self.validate_name(&input.name)?;
        let email = Email::new(input.email)?.into_inner();

        let password = match non_empty(input.password) {
            Some(_) if !current.password_login => return Err(AuthError::InvalidInput("password")),
            Some(password) => Some(self.validate_password(&password)?),
            None => None,
        };

        let update = ProfileUpdate {
            name,
            email: Some(email),
            password,
        };

        if self.user_repo.update_profile(current.id, &update).await? == 0 {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %current.id, "Profile updated");
        self.get_user(UserFilter::Id(current.id)).await
    }

    /// Delete users; `current` can not delete itself
    pub async fn delete_users(&self, current: &User, ids: &[UserId]) -> AuthResult<u64> {
        if ids.is_empty() {
            return Err(AuthError::InvalidInput("id"));
        }
        if ids.contains(&current.id) {
            return Err(AuthError::InvalidInput("id"));
        }

        let deleted = self.user_repo.delete_users(ids).await?;
        if deleted == 0 {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(deleted, by = %current.id, "Users deleted");
        Ok(deleted)
    }

    fn validate_username(&self, username: &str) -> AuthResult<String> {
        let username = username.trim();
        if !has_len(username, USERNAME_MIN_LEN, self.config.max_input_len) {
            return Err(AuthError::InvalidInput("username"));
        }
        Ok(username.to_string())
    }

    fn validate_name(&self, name: &str) -> AuthResult<String> {
        let name = name.trim();
        if !has_len(name, 1, self.config.max_input_len) {
            return Err(AuthError::InvalidInput("name"));
        }
        Ok(name.to_string())
    }

    fn validate_password(&self, password: &str) -> AuthResult<ClearTextPassword> {
        if !has_len(password, PASSWORD_MIN_LEN, self.config.max_input_len) {
            return Err(AuthError::InvalidInput("password"));
        }
        Ok(ClearTextPassword::new(password))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
