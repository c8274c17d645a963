//! Integer Identifiers
//!
//! Users, roles and lists are keyed by database serials. Wrapping them keeps
//! a list id from being passed where a user id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(i32);

impl RoleId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> i32 {
        self.0
    }
}

/// Mailing list identifier, the resource that per-list grants refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(i32);

impl ListId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_transparent() {
        assert_eq!(serde_json::to_string(&UserId::new(7)).unwrap(), "7");
        let list: ListId = serde_json::from_str("5").unwrap();
        assert_eq!(list, ListId::new(5));
    }

    #[test]
    fn test_display() {
        assert_eq!(UserId::new(42).to_string(), "42");
        assert_eq!(ListId::new(3).to_string(), "3");
    }
}
