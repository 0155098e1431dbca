//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
mod deadline;
pub mod gateway;
pub mod google_login;
pub mod login;
pub mod logout;
pub mod profile;
pub mod register;

use crate::domain::entity::session::IssuedToken;
use crate::domain::entity::user::User;

// Re-exports
pub use check_session::CheckSessionUseCase;
pub use config::AuthConfig;
pub use gateway::AuthGateway;
pub use google_login::GoogleLoginUseCase;
pub use login::{LoginInput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use profile::{ProfileUpdateInput, ProfileUseCase};
pub use register::{RegisterInput, RegisterUseCase};

/// Output of every login-family use case
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub user: User,
    pub token: IssuedToken,
}
