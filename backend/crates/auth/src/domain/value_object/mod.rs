//! Value Object Module

pub mod email;
pub mod permission;
pub mod user_id;
pub mod user_status;
pub mod user_type;
