//! User Type and Login Method

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of account
///
/// `Api` accounts are machine identities: they authenticate with a token in
/// the `Authorization` header and never through the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    User,
    Api,
}

impl UserType {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Api => "api",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "user" => Some(Self::User),
            "api" => Some(Self::Api),
            _ => None,
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How an account proves its identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    /// Username + password through the login form
    Password,
    /// OIDC provider only
    Federated,
    /// API token in the `Authorization` header
    Token,
}

impl LoginMethod {
    pub fn of(user_type: UserType, password_login: bool) -> Self {
        match (user_type, password_login) {
            (UserType::Api, _) => Self::Token,
            (UserType::User, true) => Self::Password,
            (UserType::User, false) => Self::Federated,
        }
    }
}
