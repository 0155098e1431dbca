//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no business meaning:
//! - Cryptographic utilities (SHA-256, random bytes, Base64)
//! - Password hashing (Argon2id, NIST SP 800-63B length policy) off the async executor
//! - Cookie policy and header plumbing
//! - Deadline-bounded task execution

pub mod cookie;
pub mod crypto;
pub mod password;
pub mod task;
