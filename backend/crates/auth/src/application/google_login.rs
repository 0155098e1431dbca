//! Google Login Use Case
//!
//! Signs in with a Google ID token, creating or linking the account by email.

use std::sync::Arc;

use platform::password::Argon2Hasher;

use crate::application::SessionGrant;
use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::entity::user::{LinkOutcome, User};
use crate::domain::repository::UserRepository;
use crate::domain::services::OAuthVerifier;
use crate::domain::value_object::{
    google_identity::GoogleIdentity,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenIssuer;

/// Google login use case
pub struct GoogleLoginUseCase<U, O>
where
    U: UserRepository,
    O: OAuthVerifier,
{
    user_repo: Arc<U>,
    oauth: Arc<O>,
    issuer: Arc<TokenIssuer>,
    hasher: Argon2Hasher,
    config: Arc<AuthConfig>,
}

impl<U, O> GoogleLoginUseCase<U, O>
where
    U: UserRepository,
    O: OAuthVerifier,
{
    pub fn new(
        user_repo: Arc<U>,
        oauth: Arc<O>,
        issuer: Arc<TokenIssuer>,
        hasher: Argon2Hasher,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            oauth,
            issuer,
            hasher,
            config,
        }
    }

    pub async fn execute(&self, id_token: Option<String>) -> AuthResult<SessionGrant> {
        let id_token = id_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AuthError::Validation("Google token is required".to_string()))?;

        let identity = within(
            self.config.dependency_timeout,
            self.oauth.verify(&id_token, &self.config.oauth_client_id),
        )
        .await?;

        let user = self.resolve(&identity).await?;

        // Role comes from the stored account, never from the provider
        let token = self
            .issuer
            .sign(&user.session_identity(), self.config.token_ttl)?;

        tracing::info!(user_id = %user.user_id, "Google login");

        Ok(SessionGrant { user, token })
    }

    async fn resolve(&self, identity: &GoogleIdentity) -> AuthResult<User> {
        let timeout = self.config.dependency_timeout;

        if let Some(existing) =
            within(timeout, self.user_repo.find_by_email(&identity.email)).await?
        {
            return self.link(existing, identity).await;
        }

        let placeholder = self
            .hasher
            .hash(RawPassword::placeholder().into_inner())
            .await?;
        let user = User::from_google(identity, UserPassword::from(placeholder));

        match within(timeout, self.user_repo.create(&user)).await {
            Ok(()) => {
                tracing::info!(user_id = %user.user_id, "User created from Google identity");
                Ok(user)
            }
            // Lost a creation race for the same email: link to the winner instead
            Err(AuthError::DuplicateEmail) => {
                let existing = within(timeout, self.user_repo.find_by_email(&identity.email))
                    .await?
                    .ok_or_else(|| {
                        AuthError::Internal("user vanished after duplicate email".to_string())
                    })?;
                self.link(existing, identity).await
            }
            Err(e) => Err(e),
        }
    }

    async fn link(&self, mut user: User, identity: &GoogleIdentity) -> AuthResult<User> {
        if user.link_google(identity)? == LinkOutcome::AlreadyLinked {
            return Ok(user);
        }

        let timeout = self.config.dependency_timeout;
        let linked = within(
            timeout,
            self.user_repo.link_google(
                &user.user_id,
                &identity.subject,
                identity.picture.as_deref(),
            ),
        )
        .await?;

        if linked {
            tracing::info!(user_id = %user.user_id, "Google identity linked");
            return Ok(user);
        }

        // Someone linked concurrently: only the same subject is acceptable
        let current = within(timeout, self.user_repo.find_by_id(&user.user_id))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if current.google_id.as_ref() == Some(&identity.subject) {
            Ok(current)
        } else {
            Err(AuthError::OAuthAccountConflict)
        }
    }
}
