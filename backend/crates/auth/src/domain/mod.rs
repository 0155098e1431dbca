//! Domain Layer
//!
//! Entities, value objects, repository and service traits.

pub mod entity;
pub mod repository;
pub mod services;
pub mod value_object;

// Re-exports
pub use entity::{session::AuthenticatedSession, user::User};
pub use repository::{RevocationStore, UserRepository};
pub use services::OAuthVerifier;
