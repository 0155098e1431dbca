//! Session token types
//!
//! Tokens are never persisted. These types describe what goes into a token, what
//! comes out of a verified one, and the single fact logout may read from an
//! unverified one.

use chrono::{DateTime, Utc};

use crate::domain::entity::user::User;
use crate::domain::value_object::{email::Email, user_id::UserId, user_role::UserRole};

/// Who the token speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: UserId,
    pub email: Email,
    pub user_role: UserRole,
}

/// Claims of a token whose signature and expiry have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub identity: SessionIdentity,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of decoding a token *without* verifying it.
///
/// Carries only the expiry so it cannot be mistaken for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntrospectedToken {
    expires_at: DateTime<Utc>,
}

impl IntrospectedToken {
    pub(crate) fn new(expires_at: DateTime<Utc>) -> Self {
        Self { expires_at }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Request context attached by the session middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub token: String,
    pub claims: SessionClaims,
    pub user: User,
}

/// Outcome of the non-throwing session check.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub user: Option<User>,
}

impl SessionStatus {
    pub fn authenticated(&self) -> bool {
        self.user.is_some()
    }
}
