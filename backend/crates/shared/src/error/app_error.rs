//! Application Error
//!
//! [`AppError`] is what ultimately leaves the process: a classification and a
//! user-facing, already localized message. Internal detail stays with the
//! domain error that produced it.

use std::borrow::Cow;
use std::fmt;

use super::kind::ErrorKind;

/// Unified application error
///
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::Forbidden, "Permission denied: users:manage");
/// assert_eq!(err.status_code(), 403);
/// assert_eq!(err.to_string(), "[Forbidden] Permission denied: users:manage");
/// ```
#[derive(Debug, Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}
