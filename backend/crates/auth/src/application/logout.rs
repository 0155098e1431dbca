//! Logout Use Case
//!
//! Adds the token to the revocation store until the token's own expiry.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::repository::RevocationStore;
use crate::domain::value_object::token_key::TokenKey;
use crate::error::AuthResult;
use crate::infra::jwt::TokenIssuer;

/// Logout use case
pub struct LogoutUseCase<R>
where
    R: RevocationStore,
{
    revocations: Arc<R>,
    issuer: Arc<TokenIssuer>,
    config: Arc<AuthConfig>,
}

impl<R> LogoutUseCase<R>
where
    R: RevocationStore,
{
    pub fn new(revocations: Arc<R>, issuer: Arc<TokenIssuer>, config: Arc<AuthConfig>) -> Self {
        Self {
            revocations,
            issuer,
            config,
        }
    }

    /// Idempotent: a repeated call overwrites the entry with the same expiry.
    pub async fn execute(&self, token: &str) -> AuthResult<()> {
        let expires_at = self.issuer.introspect(token)?.expires_at();
        let key = TokenKey::from_token(token);

        // An expired token is already terminal
        if expires_at <= Utc::now() {
            tracing::debug!(token_key = ?key, "Logout of expired token, nothing to revoke");
            return Ok(());
        }

        within(
            self.config.dependency_timeout,
            self.revocations.put(&key, expires_at),
        )
        .await?;

        tracing::info!(token_key = ?key, %expires_at, "Token revoked");
        Ok(())
    }
}
