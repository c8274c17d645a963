//! Authorization Model
//!
//! Turns a [`UserRecord`] into a [`User`] with O(1) permission lookups.
//! Runs on every fetch; nothing here is cached, so role edits take effect on
//! the next request.

use std::collections::{HashMap, HashSet};

use crate::domain::entity::user::{ListPermission, Role, User, UserRecord};
use crate::domain::value_object::user_type::UserType;

/// Expand a stored user into its query-optimized form
///
/// - a non-empty stored credential sets `has_password` and forces
///   `password_login` on
/// - API users lose their (placeholder) e-mail
/// - malformed list grants are logged and treated as no grants
pub fn expand(record: UserRecord) -> User {
    let has_password = record
        .password_hash
        .as_deref()
        .is_some_and(|hash| !hash.is_empty());
    let password_login = record.password_login || has_password;

    let email = match record.user_type {
        UserType::Api => None,
        UserType::User => record.email,
    };

    let lists = parse_list_permissions(record.id.get(), record.list_permissions_raw.as_deref());

    let permissions: HashSet<String> = record.role_permissions.iter().cloned().collect();

    let mut list_permissions: HashMap<_, HashSet<String>> = HashMap::new();
    for grant in &lists {
        list_permissions
            .entry(grant.id)
            .or_default()
            .extend(grant.permissions.iter().cloned());
    }

    User {
        id: record.id,
        username: record.username,
        name: record.name,
        email,
        user_type: record.user_type,
        password_login,
        has_password,
        status: record.status,
        avatar: record.avatar,
        loggedin_at: record.loggedin_at,
        created_at: record.created_at,
        updated_at: record.updated_at,
        role: Role {
            id: record.role_id,
            name: record.role_name,
            permissions: record.role_permissions,
            lists,
        },
        permissions,
        list_permissions,
    }
}

fn parse_list_permissions(user_id: i32, raw: Option<&str>) -> Vec<ListPermission> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };

    // `null` is what an empty json_agg produces
    match serde_json::from_str::<Option<Vec<ListPermission>>>(raw) {
        Ok(lists) => lists.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Failed to parse list permissions");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        permission,
        user_id::{ListId, RoleId, UserId},
        user_status::UserStatus,
    };
    use chrono::Utc;

    fn record() -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: UserId::new(1),
            username: "alice".into(),
            name: "Alice".into(),
            email: Some("alice@example.com".into()),
            user_type: UserType::User,
            password_login: false,
            password_hash: None,
            status: UserStatus::Enabled,
            avatar: None,
            loggedin_at: None,
            created_at: now,
            updated_at: now,
            role_id: RoleId::new(1),
            role_name: "Editor".into(),
            role_permissions: vec![],
            list_permissions_raw: None,
        }
    }

    #[test]
    fn test_global_and_list_permissions() {
        let mut r = record();
        r.role_permissions = vec!["users:manage".into()];
        r.list_permissions_raw = Some(r#"[{"id": 5, "permissions": ["list:view"]}]"#.into());

        let user = expand(r);

        assert!(user.permissions.contains("users:manage"));
        assert_eq!(user.permissions.len(), 1);
        assert_eq!(user.list_permissions.len(), 1);
        let list = &user.list_permissions[&ListId::new(5)];
        assert!(list.contains("list:view"));
        assert_eq!(list.len(), 1);
        assert_eq!(user.role.lists.len(), 1);
    }

    #[test]
    fn test_grant_key_aliases() {
        let mut r = record();
        r.list_permissions_raw = Some(
            r#"[{"list_id": 2, "name": "News", "permissions": ["list:get"]},
                {"resourceID": 3, "permissions": ["list:manage"]}]"#
                .into(),
        );

        let user = expand(r);
        assert!(user.can_access_list(ListId::new(2), permission::LIST_GET));
        assert!(user.can_access_list(ListId::new(3), permission::LIST_MANAGE));
        assert_eq!(user.role.lists[0].name, "News");
    }

    #[test]
    fn test_malformed_grants_degrade_to_none() {
        let mut r = record();
        r.role_permissions = vec!["users:get".into()];
        r.list_permissions_raw = Some("{not json".into());

        let user = expand(r);
        assert!(user.list_permissions.is_empty());
        assert!(user.role.lists.is_empty());
        assert!(user.has_permission("users:get"));
    }

    #[test]
    fn test_null_grants() {
        let mut r = record();
        r.list_permissions_raw = Some("null".into());
        assert!(expand(r).list_permissions.is_empty());
    }

    #[test]
    fn test_password_presence() {
        let mut r = record();
        r.password_hash = Some("$2a$06$abcdef".into());
        let user = expand(r);
        assert!(user.has_password);
        assert!(user.password_login);

        let mut r = record();
        r.password_hash = Some(String::new());
        let user = expand(r);
        assert!(!user.has_password);
        assert!(!user.password_login);
    }

    #[test]
    fn test_api_user_email_scrubbed() {
        let mut r = record();
        r.user_type = UserType::Api;
        r.email = Some("bot@api".into());
        r.password_hash = Some("hashed-token".into());

        let user = expand(r);
        assert_eq!(user.email, None);

        let json = serde_json::to_value(&user).unwrap();
        assert!(json["email"].is_null());
        assert_eq!(json["type"], "api");
    }

    #[test]
    fn test_global_list_permissions_cover_all_lists() {
        let mut r = record();
        r.role_permissions = vec![permission::LISTS_GET_ALL.into()];
        let user = expand(r);

        assert!(user.can_access_list(ListId::new(99), permission::LIST_GET));
        assert!(!user.can_access_list(ListId::new(99), permission::LIST_MANAGE));
    }

    #[test]
    fn test_permitted_lists() {
        let mut r = record();
        r.list_permissions_raw = Some(
            r#"[{"id": 9, "permissions": ["list:get", "list:manage"]},
                {"id": 4, "permissions": ["list:get"]}]"#
                .into(),
        );
        let user = expand(r);
        assert_eq!(
            user.permitted_lists(permission::LIST_GET),
            vec![ListId::new(4), ListId::new(9)]
        );
        assert_eq!(user.permitted_lists(permission::LIST_MANAGE), vec![ListId::new(9)]);
        assert!(!user.has_any_permission(&[]));
    }

    #[test]
    fn test_serialized_user_has_no_credential() {
        let mut r = record();
        r.password_hash = Some("secret-hash".into());
        let json = serde_json::to_string(&expand(r)).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"hasPassword\":true"));
    }
}
