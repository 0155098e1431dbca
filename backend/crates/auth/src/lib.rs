//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and service traits
//! - `application/` - Use cases, the [`AuthGateway`] facade, configuration
//! - `infra/` - PostgreSQL stores, in-memory stores, JWT issuer, Google verifier
//! - `presentation/` - HTTP handlers, DTOs, session middleware, router
//!
//! ## Features
//! - Register / login with email + password
//! - Google sign-in with account linking (first link wins, conflicts rejected)
//! - Stateless HS256 session tokens carried in an HttpOnly cookie
//! - Logout through a self-expiring deny-list of revoked tokens
//! - Profile read/update, admin-only account provisioning
//!
//! ## Security Model
//! - Passwords hashed with Argon2id on the blocking pool
//! - Login failures are indistinguishable (unknown email vs wrong password)
//! - Token-state failures (invalid, expired, revoked) collapse into one 401
//! - Revocation is checked on every authenticated request, before expiry matters

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::{AuthConfig, AuthGateway};
pub use error::{AuthError, AuthResult};
pub use infra::{GoogleOAuthVerifier, PgRevocationStore, PgUserRepository, TokenIssuer};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
