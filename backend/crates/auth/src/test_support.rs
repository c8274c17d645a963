//! Shared test fixtures: a seeded in-memory store and a scripted identity
//! provider.

use std::sync::LazyLock;

use parking_lot::Mutex;
use platform::password::ClearTextPassword;
use url::Url;

use crate::domain::entity::{identity::IdentityClaims, user::ListPermission};
use crate::domain::provider::IdentityProvider;
use crate::domain::value_object::user_id::ListId;
use crate::error::{AuthError, AuthResult};
use crate::infra::memory::MemoryAuthRepository;

pub(crate) mod fixtures {
    use chrono::Utc;

    use crate::domain::entity::user::{NewUser, User, UserRecord};
    use crate::domain::permissions::expand;
    use crate::domain::value_object::{
        permission,
        user_id::{RoleId, UserId},
        user_status::UserStatus,
        user_type::UserType,
    };

    pub const ADMIN_PASSWORD: &str = "admin-password";
    pub const LOCKED_PASSWORD: &str = "locked-password";
    pub const ROBOT_TOKEN: &str = "r0b0tT0kenr0b0tT0kenr0b0tT0ken12";

    pub const ADMIN_ROLE: RoleId = RoleId::new(1);
    pub const VIEWER_ROLE: RoleId = RoleId::new(2);

    pub const ADMIN_PERMISSIONS: &[&str] = permission::ALL_GLOBAL;

    pub fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            name: username.into(),
            email: email.into(),
            user_type: UserType::User,
            password_login: true,
            password: None,
            role_id: VIEWER_ROLE,
            status: UserStatus::Enabled,
        }
    }

    fn record(id: i32, username: &str, role_id: RoleId, role_name: &str, perms: &[&str]) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: UserId::new(id),
            username: username.into(),
            name: username.into(),
            email: Some(format!("{username}@example.com")),
            user_type: UserType::User,
            password_login: false,
            password_hash: None,
            status: UserStatus::Enabled,
            avatar: None,
            loggedin_at: None,
            created_at: now,
            updated_at: now,
            role_id,
            role_name: role_name.into(),
            role_permissions: perms.iter().map(|p| p.to_string()).collect(),
            list_permissions_raw: None,
        }
    }

    /// User #1 as seeded by [`super::store`]
    pub fn admin_user() -> User {
        let mut r = record(1, "admin", ADMIN_ROLE, "Super Admin", ADMIN_PERMISSIONS);
        r.password_hash = Some(super::ADMIN_HASH.clone());
        expand(r)
    }

    /// User #2: federated only
    pub fn viewer_user() -> User {
        expand(record(2, "viewer", VIEWER_ROLE, "Viewer", &[permission::USERS_GET]))
    }

    /// User #3: disabled
    pub fn locked_user() -> User {
        let mut r = record(3, "locked", VIEWER_ROLE, "Viewer", &[permission::USERS_GET]);
        r.status = UserStatus::Disabled;
        expand(r)
    }
}

static ADMIN_HASH: LazyLock<String> = LazyLock::new(|| hash(fixtures::ADMIN_PASSWORD));
static LOCKED_HASH: LazyLock<String> = LazyLock::new(|| hash(fixtures::LOCKED_PASSWORD));
static ROBOT_HASH: LazyLock<String> = LazyLock::new(|| hash(fixtures::ROBOT_TOKEN));

fn hash(password: &str) -> String {
    ClearTextPassword::new(password)
        .hash()
        .unwrap()
        .as_phc_string()
        .to_string()
}

/// Store seeded with two roles and four users:
/// `admin` (password), `viewer` (federated), `locked` (disabled) and
/// `robot` (API)
pub(crate) fn store() -> MemoryAuthRepository {
    use crate::domain::value_object::{
        permission, user_status::UserStatus, user_type::UserType,
    };

    let repo = MemoryAuthRepository::new();
    repo.insert_role(
        fixtures::ADMIN_ROLE,
        "Super Admin",
        fixtures::ADMIN_PERMISSIONS,
        Vec::new(),
    );
    repo.insert_role(
        fixtures::VIEWER_ROLE,
        "Viewer",
        &[permission::USERS_GET],
        vec![ListPermission {
            id: ListId::new(3),
            name: "Newsletter".into(),
            permissions: vec![permission::LIST_GET.into()],
        }],
    );

    let mut admin = fixtures::new_user("admin", "admin@example.com");
    admin.role_id = fixtures::ADMIN_ROLE;
    repo.insert_user_with_hash(&admin, Some(ADMIN_HASH.clone()))
        .unwrap();

    let mut viewer = fixtures::new_user("viewer", "viewer@example.com");
    viewer.password_login = false;
    repo.insert_user_with_hash(&viewer, None).unwrap();

    let mut locked = fixtures::new_user("locked", "locked@example.com");
    locked.status = UserStatus::Disabled;
    repo.insert_user_with_hash(&locked, Some(LOCKED_HASH.clone()))
        .unwrap();

    let mut robot = fixtures::new_user("robot", "robot@api");
    robot.user_type = UserType::Api;
    robot.password_login = false;
    repo.insert_user_with_hash(&robot, Some(ROBOT_HASH.clone()))
        .unwrap();

    repo
}

/// Identity provider answering every exchange with a fixed e-mail, or
/// failing every exchange
pub(crate) struct StubIdentityProvider {
    email: Option<String>,
    picture: Option<String>,
    last_nonce: Mutex<Option<String>>,
}

impl StubIdentityProvider {
    pub fn returning(email: &str) -> Self {
        Self {
            email: Some(email.into()),
            picture: None,
            last_nonce: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            email: None,
            picture: None,
            last_nonce: Mutex::new(None),
        }
    }

    pub fn with_picture(mut self, picture: &str) -> Self {
        self.picture = Some(picture.into());
        self
    }

    /// Nonce passed to the latest exchange
    pub fn last_nonce(&self) -> Option<String> {
        self.last_nonce.lock().clone()
    }
}

impl IdentityProvider for StubIdentityProvider {
    fn authorization_url(&self, next: &str, nonce: &str) -> String {
        Url::parse_with_params(
            "https://idp.test/authorize",
            &[("state", next), ("nonce", nonce)],
        )
        .map(String::from)
        .unwrap()
    }

    async fn exchange_code(
        &self,
        code: &str,
        nonce: &str,
    ) -> AuthResult<(String, IdentityClaims)> {
        *self.last_nonce.lock() = Some(nonce.to_string());

        match &self.email {
            Some(email) => Ok((
                format!("id-token-for-{code}"),
                IdentityClaims {
                    email: email.clone(),
                    picture: self.picture.clone(),
                },
            )),
            None => Err(AuthError::IdentityExchangeFailed(
                "provider rejected the code".into(),
            )),
        }
    }
}
