//! Auth Session Entity
//!
//! Server-side session record; the client only holds a signed reference to
//! `session_id` in its cookie.

use chrono::{DateTime, Duration, Utc};
use kernel::id::SessionId;

use crate::domain::value_object::user_id::UserId;

/// Auth session entity
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: SessionId,
    pub user_id: UserId,
    /// Raw ID token for federated logins, `None` for password logins
    pub provider_token: Option<String>,
    /// Session expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl AuthSession {
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn new(user_id: UserId, provider_token: Option<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            session_id: SessionId::new(),
            user_id,
            provider_token,
            expires_at_ms: (now + ttl).timestamp_millis(),
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    pub fn remaining_ms(&self) -> i64 {
        let now_ms = Utc::now().timestamp_millis();
        (self.expires_at_ms - now_ms).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_not_expired() {
        let session = AuthSession::new(UserId::new(1), None, Duration::hours(1));
        assert!(!session.is_expired());
        assert!(session.remaining_ms() > 59 * 60 * 1000);
        assert_eq!(session.created_at, session.last_activity_at);
    }

    #[test]
    fn test_expired_session() {
        let session = AuthSession::new(UserId::new(1), None, Duration::milliseconds(-10));
        assert!(session.is_expired());
        assert_eq!(session.remaining_ms(), 0);
    }

    #[test]
    fn test_touch() {
        let mut session =
            AuthSession::new(UserId::new(1), Some("id-token".into()), Duration::hours(1));
        let before = session.last_activity_at;
        session.touch();
        assert!(session.last_activity_at >= before);
        assert_eq!(session.provider_token.as_deref(), Some("id-token"));
    }
}
