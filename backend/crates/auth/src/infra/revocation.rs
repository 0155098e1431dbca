//! Revocation store on a dedicated PostgreSQL pool
//!
//! Entries are durable until their own `expires_at`. Expired rows are invisible to
//! `contains` and are swept by [`PgRevocationStore::purge_expired`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::domain::repository::RevocationStore;
use crate::domain::value_object::token_key::TokenKey;
use crate::error::{AuthError, AuthResult};

#[derive(Clone)]
pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    /// Connect lazily so the service can boot while the store is still coming up.
    pub fn connect(url: &str, max_connections: u32, acquire_timeout: Duration) -> AuthResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(url)
            .map_err(|e| AuthError::Internal(format!("invalid revocation store url: {e}")))?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn purge_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(unavailable)?
            .rows_affected();

        tracing::info!(entries_deleted = deleted, "Purged expired revocation entries");

        Ok(deleted)
    }
}

/// Any store failure means revocation state is unknown.
fn unavailable(err: sqlx::Error) -> AuthError {
    AuthError::ServiceUnavailable(format!("revocation store: {err}"))
}

impl RevocationStore for PgRevocationStore {
    async fn put(&self, key: &TokenKey, expires_at: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (token_key, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (token_key) DO UPDATE SET expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(key.as_bytes().as_slice())
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(())
    }

    async fn contains(&self, key: &TokenKey) -> AuthResult<bool> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE token_key = $1 AND expires_at > NOW())",
        )
        .bind(key.as_bytes().as_slice())
        .fetch_one(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(found)
    }
}
