//! Permission Names
//!
//! Roles carry free-form permission strings; these are the ones the auth
//! core itself checks. Other components may define more.

pub const USERS_GET: &str = "users:get";
pub const USERS_MANAGE: &str = "users:manage";
pub const ROLES_GET: &str = "roles:get";
pub const ROLES_MANAGE: &str = "roles:manage";

/// Read every list regardless of per-list grants
pub const LISTS_GET_ALL: &str = "lists:get_all";
/// Manage every list regardless of per-list grants
pub const LISTS_MANAGE_ALL: &str = "lists:manage_all";

/// Per-list read grant
pub const LIST_GET: &str = "list:get";
/// Per-list manage grant
pub const LIST_MANAGE: &str = "list:manage";

/// Every global permission above, as granted to the built-in admin role
pub const ALL_GLOBAL: &[&str] = &[
    USERS_GET,
    USERS_MANAGE,
    ROLES_GET,
    ROLES_MANAGE,
    LISTS_GET_ALL,
    LISTS_MANAGE_ALL,
];

/// Global permission that implies a per-list one on every list
pub fn global_equivalent(list_permission: &str) -> Option<&'static str> {
    match list_permission {
        LIST_GET => Some(LISTS_GET_ALL),
        LIST_MANAGE => Some(LISTS_MANAGE_ALL),
        _ => None,
    }
}
