//! Value Object Module

pub mod email;
pub mod google_identity;
pub mod person_name;
pub mod profile;
pub mod token_key;
pub mod user_id;
pub mod user_password;
pub mod user_role;
