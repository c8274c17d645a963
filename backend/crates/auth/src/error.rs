//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Client-facing text comes from the
//! [`I18n`] catalog; the `Display` text is for logs only.

use axum::http::StatusCode;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::application::i18n::I18n;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// A form or body field failed validation; carries the field name
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Request failed the login handshake checks (nonce mismatch, missing code)
    #[error("Unauthorized request")]
    Unauthorized,

    /// Unknown user or wrong password; the two are never distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Code exchange or ID token verification failed
    #[error("Identity exchange failed: {0}")]
    IdentityExchangeFailed(String),

    #[error("User not found")]
    UserNotFound,

    /// Username or e-mail collides with an existing user
    #[error("User name already exists")]
    UserNameTaken,

    #[error("Account is disabled")]
    AccountDisabled,

    /// Authenticated, but the named permission is missing
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Session not found, expired, or its token signature is wrong
    #[error("Session not found or expired")]
    SessionInvalid,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized
            | AuthError::IdentityExchangeFailed(_)
            | AuthError::SessionInvalid => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCredentials
            | AuthError::AccountDisabled
            | AuthError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::UserNameTaken => StatusCode::CONFLICT,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidInput(_) => ErrorKind::BadRequest,
            AuthError::Unauthorized
            | AuthError::IdentityExchangeFailed(_)
            | AuthError::SessionInvalid => ErrorKind::Unauthorized,
            AuthError::InvalidCredentials
            | AuthError::AccountDisabled
            | AuthError::PermissionDenied(_) => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::UserNameTaken => ErrorKind::Conflict,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Localized, client-safe message
    pub fn message(&self, i18n: &I18n) -> String {
        match self {
            AuthError::InvalidInput(field) => {
                i18n.ts("globals.messages.invalidFields", &[("name", *field)])
            }
            AuthError::Unauthorized | AuthError::IdentityExchangeFailed(_) => {
                i18n.t("users.invalidRequest")
            }
            AuthError::InvalidCredentials => i18n.t("users.invalidLogin"),
            AuthError::UserNotFound => {
                i18n.ts("globals.messages.notFound", &[("name", "{globals.terms.user}")])
            }
            AuthError::UserNameTaken => i18n.t("users.usernameExists"),
            AuthError::AccountDisabled => i18n.t("users.accountDisabled"),
            AuthError::PermissionDenied(perm) => {
                i18n.ts("globals.messages.permissionDenied", &[("name", perm.as_str())])
            }
            AuthError::SessionInvalid => i18n.t("users.invalidSession"),
            AuthError::Database(_) | AuthError::Internal(_) => {
                i18n.t("globals.messages.internalError")
            }
        }
    }

    /// Convert to AppError, logging on the way out
    pub fn to_app_error(&self, i18n: &I18n) -> AppError {
        self.log();
        AppError::new(self.kind(), self.message(i18n))
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::IdentityExchangeFailed(detail) => {
                tracing::warn!(detail = %detail, "OIDC code exchange failed");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Unauthorized => {
                tracing::warn!("Login handshake rejected");
            }
            AuthError::PermissionDenied(perm) => {
                tracing::info!(permission = %perm, "Permission denied");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(AuthError::InvalidInput("username").status_code(), 400);
        assert_eq!(AuthError::Unauthorized.status_code(), 401);
        assert_eq!(AuthError::InvalidCredentials.status_code(), 403);
        assert_eq!(
            AuthError::IdentityExchangeFailed("timeout".into()).status_code(),
            401
        );
        assert_eq!(AuthError::UserNotFound.status_code(), 404);
        assert_eq!(AuthError::AccountDisabled.status_code(), 403);
        assert_eq!(AuthError::PermissionDenied("users:get".into()).status_code(), 403);
        assert_eq!(AuthError::SessionInvalid.status_code(), 401);
        assert_eq!(AuthError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_kind_matches_status() {
        let errors = [
            AuthError::InvalidInput("password"),
            AuthError::Unauthorized,
            AuthError::InvalidCredentials,
            AuthError::UserNotFound,
            AuthError::UserNameTaken,
            AuthError::SessionInvalid,
            AuthError::Internal("x".into()),
        ];
        for err in errors {
            assert_eq!(err.kind().status_code(), err.status_code().as_u16(), "{err}");
        }
    }

    #[test]
    fn test_messages_are_localized() {
        let i18n = I18n::default();
        assert_eq!(
            AuthError::InvalidInput("username").message(&i18n),
            "Invalid fields: username"
        );
        assert_eq!(AuthError::UserNotFound.message(&i18n), "User not found");
        assert_eq!(
            AuthError::InvalidCredentials.message(&i18n),
            "Invalid login or password"
        );
    }

    #[test]
    fn test_internal_detail_never_reaches_client() {
        let i18n = I18n::default();
        let err = AuthError::Internal("connection refused to 10.0.0.5".into());
        let app_err = err.to_app_error(&i18n);
        assert_eq!(app_err.status_code(), 500);
        assert!(!app_err.message().contains("10.0.0.5"));

        let err = AuthError::IdentityExchangeFailed("jwks fetch failed".into());
        assert!(!err.message(&i18n).contains("jwks"));
    }
}
