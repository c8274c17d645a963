//! Password Hashing and Verification
//!
//! Argon2id hashing with zeroization of the clear text. Length rules belong
//! to the caller; this module never rejects a password for its content.

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    #[error("Hashing task failed: {0}")]
    TaskFailed(String),
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Not `Clone`, and `Debug` output is redacted.
///
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let password = ClearTextPassword::new("my_secure_password");
/// let hashed = password.hash().unwrap();
/// assert!(hashed.verify(&password));
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash the password using Argon2id (PHC string output)
    pub fn hash(&self) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(OsRng);

        // OWASP recommended Argon2id parameters:
        // m=19456 (19 MiB), t=2, p=1
        let hash = Argon2::default()
            .hash_password(self.as_bytes(), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }

    /// [`Self::hash`] on the blocking thread pool
    pub async fn hash_blocking(self) -> Result<HashedPassword, PasswordHashError> {
        tokio::task::spawn_blocking(move || self.hash())
            .await
            .map_err(|e| PasswordHashError::TaskFailed(e.to_string()))?
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from storage)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash
    ///
    /// Argon2 compares in constant time.
    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&self.hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// [`Self::verify`] on the blocking thread pool
    pub async fn verify_blocking(
        self,
        password: ClearTextPassword,
    ) -> Result<bool, PasswordHashError> {
        tokio::task::spawn_blocking(move || self.verify(&password))
            .await
            .map_err(|e| PasswordHashError::TaskFailed(e.to_string()))
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::new("correct horse battery");
        let hashed = password.hash().unwrap();

        assert!(hashed.as_phc_string().starts_with("$argon2id$"));
        assert!(hashed.verify(&password));
        assert!(!hashed.verify(&ClearTextPassword::new("wrong password")));
    }

    #[test]
    fn test_hashes_are_salted() {
        let password = ClearTextPassword::new("same password");
        let a = password.hash().unwrap();
        let b = password.hash().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_phc_string() {
        let hashed = ClearTextPassword::new("password123").hash().unwrap();
        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&ClearTextPassword::new("password123")));

        assert!(matches!(
            HashedPassword::from_phc_string("not-a-hash"),
            Err(PasswordHashError::InvalidHashFormat)
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = ClearTextPassword::new("super secret");
        let debug = format!("{:?}", password);
        assert!(!debug.contains("super secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let hashed = ClearTextPassword::new("password123")
            .hash_blocking()
            .await
            .unwrap();
        let ok = hashed
            .clone()
            .verify_blocking(ClearTextPassword::new("password123"))
            .await
            .unwrap();
        assert!(ok);
        let bad = hashed
            .verify_blocking(ClearTextPassword::new("password124"))
            .await
            .unwrap();
        assert!(!bad);
    }
}
