//! Auth Middleware
//!
//! Middleware for requiring authentication on protected routes.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use kernel::error::app_error::AppResult;
use kernel::id::SessionId;
use platform::cookie::extract_cookie;

use crate::application::{Authenticated, CheckSessionUseCase};
use crate::domain::entity::user::User;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::handlers::AuthAppState;

/// Authenticated caller, stored in request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// `None` for API token callers
    pub session_id: Option<SessionId>,
}

impl From<Authenticated> for CurrentUser {
    fn from(auth: Authenticated) -> Self {
        Self {
            user: auth.user,
            session_id: auth.session_id,
        }
    }
}

/// Middleware that requires an API token or a valid session
///
/// A `token` scheme `Authorization` header takes precedence over the session
/// cookie. Other schemes are ignored.
pub async fn require_auth<R, P>(
    State(state): State<AuthAppState<R, P>>,
    mut req: Request,
    next: Next,
) -> AppResult<Response>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| value.trim_start().starts_with("token "))
        .map(str::to_string);
    let session_token = extract_cookie(req.headers(), &state.config.session_cookie_name);

    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.sessions());

    let result = match (authorization, session_token) {
        (Some(authorization), _) => use_case.from_api_token(&authorization).await,
        (None, Some(token)) => use_case.from_session_token(&token).await,
        (None, None) => Err(AuthError::SessionInvalid),
    };

    let authenticated = result.map_err(|e| e.to_app_error(&state.config.i18n))?;

    req.extensions_mut().insert(CurrentUser::from(authenticated));

    Ok(next.run(req).await)
}

/// Require every permission in `perms`
///
/// The first missing one is reported.
pub fn ensure_permission(user: &User, perms: &[&str]) -> AuthResult<()> {
    match perms.iter().find(|perm| !user.has_permission(perm)) {
        Some(missing) => Err(AuthError::PermissionDenied(missing.to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::permission;
    use crate::test_support::fixtures;

    #[test]
    fn test_ensure_permission() {
        let admin = fixtures::admin_user();
        assert!(ensure_permission(&admin, &[permission::USERS_GET, permission::USERS_MANAGE]).is_ok());
        assert!(ensure_permission(&admin, &[]).is_ok());

        let viewer = fixtures::viewer_user();
        assert!(ensure_permission(&viewer, &[permission::USERS_GET]).is_ok());

        match ensure_permission(&viewer, &[permission::USERS_GET, permission::USERS_MANAGE]) {
            Err(AuthError::PermissionDenied(perm)) => assert_eq!(perm, permission::USERS_MANAGE),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
