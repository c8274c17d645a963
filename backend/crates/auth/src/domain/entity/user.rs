//! User Entity
//!
//! Two shapes of the same account:
//! - [`UserRecord`]: what the credential store returns, role grants still raw
//! - [`User`]: the expanded view with permission lookups, built only by
//!   [`crate::domain::permissions::expand`]

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use platform::password::ClearTextPassword;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{
    permission,
    user_id::{ListId, RoleId, UserId},
    user_status::UserStatus,
    user_type::{LoginMethod, UserType},
};

// ============================================================================
// Stored shape
// ============================================================================

/// User row joined with its role, as returned by the credential store
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub user_type: UserType,
    pub password_login: bool,
    /// Stored credential hash; only its presence is ever looked at
    pub password_hash: Option<String>,
    pub status: UserStatus,
    pub avatar: Option<String>,
    pub loggedin_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub role_id: RoleId,
    pub role_name: String,
    pub role_permissions: Vec<String>,
    /// JSON array of [`ListPermission`] objects, as aggregated by the store
    pub list_permissions_raw: Option<String>,
}

/// Per-list grant of a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPermission {
    #[serde(alias = "list_id", alias = "listId", alias = "resourceId", alias = "resourceID")]
    pub id: ListId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

// ============================================================================
// Expanded shape
// ============================================================================

/// Role as attached to an expanded user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<String>,
    pub lists: Vec<ListPermission>,
}

/// Expanded user
///
/// Never carries a credential. `permissions` and `list_permissions` are
/// lookup structures derived from `role` and are not serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub password_login: bool,
    pub has_password: bool,
    pub status: UserStatus,
    pub avatar: Option<String>,
    pub loggedin_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub role: Role,
    #[serde(skip)]
    pub permissions: HashSet<String>,
    #[serde(skip)]
    pub list_permissions: HashMap<ListId, HashSet<String>>,
}

impl User {
    pub fn login_method(&self) -> LoginMethod {
        LoginMethod::of(self.user_type, self.password_login)
    }

    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    /// Whether the role grants the global permission `perm`
    pub fn has_permission(&self, perm: &str) -> bool {
        self.permissions.contains(perm)
    }

    pub fn has_any_permission(&self, perms: &[&str]) -> bool {
        perms.iter().any(|p| self.has_permission(p))
    }

    /// Whether `perm` (`list:get` / `list:manage`) holds on `list_id`
    ///
    /// The global `lists:get_all` / `lists:manage_all` permissions cover
    /// every list.
    pub fn can_access_list(&self, list_id: ListId, perm: &str) -> bool {
        if permission::global_equivalent(perm).is_some_and(|global| self.has_permission(global)) {
            return true;
        }

        self.list_permissions
            .get(&list_id)
            .is_some_and(|perms| perms.contains(perm))
    }

    /// Lists on which `perm` was granted explicitly, ascending
    ///
    /// Global permissions are not reflected here; check
    /// [`Self::has_permission`] for them first.
    pub fn permitted_lists(&self, perm: &str) -> Vec<ListId> {
        let mut ids: Vec<ListId> = self
            .list_permissions
            .iter()
            .filter(|(_, perms)| perms.contains(perm))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }
}

// ============================================================================
// Store inputs
// ============================================================================

/// Which users to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    All,
    Id(UserId),
    Username(String),
    /// Matched case-insensitively
    Email(String),
}

/// New account
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub email: String,
    pub user_type: UserType,
    pub password_login: bool,
    /// Clear text; the store hashes it. For API users this is the token.
    pub password: Option<ClearTextPassword>,
    pub role_id: RoleId,
    pub status: UserStatus,
}

/// Administrative update of an account
///
/// `password: None` keeps the stored credential.
#[derive(Debug)]
pub struct UserUpdate {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password_login: bool,
    pub password: Option<ClearTextPassword>,
    pub role_id: RoleId,
    pub status: UserStatus,
}

/// Self-service update; `None` fields are left unchanged
#[derive(Debug)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: Option<String>,
    pub password: Option<ClearTextPassword>,
}
