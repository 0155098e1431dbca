//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod google;
pub mod jwt;
pub mod memory;
pub mod postgres;
pub mod revocation;

pub use google::GoogleOAuthVerifier;
pub use jwt::TokenIssuer;
pub use memory::{MemoryRevocationStore, MemoryUserRepository};
pub use postgres::PgUserRepository;
pub use revocation::PgRevocationStore;
