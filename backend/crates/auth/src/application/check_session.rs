//! Check Session Use Case
//!
//! Resolves a cookie token into the session it represents.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::entity::session::{AuthenticatedSession, SessionStatus};
use crate::domain::repository::{RevocationStore, UserRepository};
use crate::domain::value_object::token_key::TokenKey;
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenIssuer;

/// Check session use case
pub struct CheckSessionUseCase<U, R>
where
    U: UserRepository,
    R: RevocationStore,
{
    user_repo: Arc<U>,
    revocations: Arc<R>,
    issuer: Arc<TokenIssuer>,
    config: Arc<AuthConfig>,
}

impl<U, R> CheckSessionUseCase<U, R>
where
    U: UserRepository,
    R: RevocationStore,
{
    pub fn new(
        user_repo: Arc<U>,
        revocations: Arc<R>,
        issuer: Arc<TokenIssuer>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            revocations,
            issuer,
            config,
        }
    }

    /// Signature and expiry, then the deny-list, then the account itself.
    pub async fn authenticate(&self, token: Option<&str>) -> AuthResult<AuthenticatedSession> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        let claims = self.issuer.verify(token)?;
        let timeout = self.config.dependency_timeout;

        let key = TokenKey::from_token(token);
        if within(timeout, self.revocations.contains(&key)).await? {
            return Err(AuthError::RevokedToken);
        }

        let user = within(timeout, self.user_repo.find_by_id(&claims.identity.user_id))
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        Ok(AuthenticatedSession {
            token: token.to_string(),
            claims,
            user,
        })
    }

    /// Never fails: every problem reads as "not authenticated".
    pub async fn status(&self, token: Option<&str>) -> SessionStatus {
        match self.authenticate(token).await {
            Ok(session) => SessionStatus {
                user: Some(session.user),
            },
            Err(e) => {
                if e.kind().is_server_error() {
                    tracing::warn!(error = %e, "Session check degraded to unauthenticated");
                }
                SessionStatus { user: None }
            }
        }
    }
}
