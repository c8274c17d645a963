//! User Administration Handlers
//!
//! Mounted behind [`require_auth`](crate::presentation::middleware::require_auth);
//! every handler reads the caller from the [`CurrentUser`] extension.

use axum::Json;
use axum::extract::{Extension, Path, State};
use kernel::error::app_error::AppResult;

use crate::application::{CreateUserInput, ProfileInput, UpdateUserInput, UserAdminUseCase};
use crate::domain::entity::user::{User, UserFilter};
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{permission, user_id::UserId};
use crate::presentation::dto::{
    CreateUserRequest, CreateUserResponse, DataResponse, ProfileRequest, UpdateUserRequest,
};
use crate::presentation::handlers::AuthAppState;
use crate::presentation::middleware::{CurrentUser, ensure_permission};

fn admin<R, P>(state: &AuthAppState<R, P>) -> UserAdminUseCase<R>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    UserAdminUseCase::new(state.repo.clone(), state.config.clone())
}

// ============================================================================
// Users
// ============================================================================

/// GET /api/users
pub async fn get_users<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<DataResponse<Vec<User>>>>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let i18n = &state.config.i18n;
    ensure_permission(&current.user, &[permission::USERS_GET]).map_err(|e| e.to_app_error(i18n))?;

    let users = admin(&state)
        .get_users()
        .await
        .map_err(|e| e.to_app_error(i18n))?;

    Ok(Json(DataResponse::new(users)))
}

/// GET /api/users/{id}
pub async fn get_user<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<DataResponse<User>>>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let i18n = &state.config.i18n;
    ensure_permission(&current.user, &[permission::USERS_GET]).map_err(|e| e.to_app_error(i18n))?;

    let user = admin(&state)
        .get_user(UserFilter::Id(UserId::new(id)))
        .await
        .map_err(|e| e.to_app_error(i18n))?;

    Ok(Json(DataResponse::new(user)))
}

/// POST /api/users
pub async fn create_user<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<Json<DataResponse<CreateUserResponse>>>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let i18n = &state.config.i18n;
    ensure_permission(&current.user, &[permission::USERS_MANAGE])
        .map_err(|e| e.to_app_error(i18n))?;

    let input = CreateUserInput {
        username: req.username,
        name: req.name,
        email: req.email,
        user_type: req.user_type,
        password_login: req.password_login,
        password: req.password,
        role_id: req.role_id,
        status: req.status,
    };

    let output = admin(&state)
        .create_user(input)
        .await
        .map_err(|e| e.to_app_error(i18n))?;

    Ok(Json(DataResponse::new(CreateUserResponse {
        user: output.user,
        api_token: output.api_token,
    })))
}

/// PUT /api/users/{id}
pub async fn update_user<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<User>>>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let i18n = &state.config.i18n;
    ensure_permission(&current.user, &[permission::USERS_MANAGE])
        .map_err(|e| e.to_app_error(i18n))?;

    let input = UpdateUserInput {
        username: req.username,
        name: req.name,
        email: req.email,
        password_login: req.password_login,
        password: req.password,
        role_id: req.role_id,
        status: req.status,
    };

    let user = admin(&state)
        .update_user(UserId::new(id), input)
        .await
        .map_err(|e| e.to_app_error(i18n))?;

    Ok(Json(DataResponse::new(user)))
}

/// DELETE /api/users/{id}
pub async fn delete_user<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<DataResponse<bool>>>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let i18n = &state.config.i18n;
    ensure_permission(&current.user, &[permission::USERS_MANAGE])
        .map_err(|e| e.to_app_error(i18n))?;

    admin(&state)
        .delete_users(&current.user, &[UserId::new(id)])
        .await
        .map_err(|e| e.to_app_error(i18n))?;

    Ok(Json(DataResponse::new(true)))
}

// ============================================================================
// Profile
// ============================================================================

/// GET /api/profile
pub async fn get_profile(
    Extension(current): Extension<CurrentUser>,
) -> Json<DataResponse<User>> {
    Json(DataResponse::new(current.user))
}

/// PUT /api/profile
pub async fn update_profile<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ProfileRequest>,
) -> AppResult<Json<DataResponse<User>>>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let input = ProfileInput {
        name: req.name,
        email: req.email,
        password: req.password,
    };

    let user = admin(&state)
        .update_profile(&current.user, input)
        .await
        .map_err(|e| e.to_app_error(&state.config.i18n))?;

    Ok(Json(DataResponse::new(user)))
}
