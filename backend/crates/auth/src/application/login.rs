//! Login Use Case
//!
//! Email + password authentication.

use std::sync::Arc;

use platform::password::Argon2Hasher;

use crate::application::SessionGrant;
use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenIssuer;

/// Login input
pub struct LoginInput {
    pub email_id: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    issuer: Arc<TokenIssuer>,
    hasher: Argon2Hasher,
    config: Arc<AuthConfig>,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        issuer: Arc<TokenIssuer>,
        hasher: Argon2Hasher,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            issuer,
            hasher,
            config,
        }
    }

    /// Every credential failure, including malformed input, is `InvalidCredentials`.
    pub async fn execute(&self, input: LoginInput) -> AuthResult<SessionGrant> {
        let email = Email::new(input.email_id).map_err(|_| AuthError::InvalidCredentials)?;
        let password =
            RawPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        let user = within(
            self.config.dependency_timeout,
            self.user_repo.find_by_email(&email),
        )
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

        let matched = self
            .hasher
            .verify(password.into_inner(), user.password.hashed().clone())
            .await?;

        if !matched {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .issuer
            .sign(&user.session_identity(), self.config.token_ttl)?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(SessionGrant { user, token })
    }
}
