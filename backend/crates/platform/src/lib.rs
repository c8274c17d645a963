//! Platform Crate - Technical Infrastructure
//!
//! Building blocks without business meaning:
//! - Random tokens and constant-time comparison
//! - Password hashing (Argon2id)
//! - Cookie building and parsing
//! - Redirect target sanitizing
//! - Input length checks

pub mod cookie;
pub mod crypto;
pub mod password;
pub mod text;
pub mod uri;
