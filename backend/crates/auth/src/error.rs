//! Auth Error Types
//!
//! Auth-specific error variants that render through the unified
//! `kernel::error::AppError` problem-details response.

use std::borrow::Cow;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::conversions::{DbFailure, classify_sqlx};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::PasswordHashError;
use platform::task::TaskError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed request field
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Email is already registered")]
    DuplicateEmail,

    /// Unknown email or wrong password. Deliberately the same error for both.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bad signature, malformed, or missing required claims
    #[error("Token is invalid")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Token has been revoked")]
    RevokedToken,

    /// No token, or the token's user no longer exists
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("OAuth token rejected: {0}")]
    InvalidOAuthToken(String),

    /// The email is already linked to a different third-party identity
    #[error("Account is linked to a different Google identity")]
    OAuthAccountConflict,

    #[error("Insufficient role")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    /// A dependency (database, revocation store, hasher, identity provider) is down or slow
    #[error("Dependency unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) | AuthError::DuplicateEmail => ErrorKind::BadRequest,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::RevokedToken
            | AuthError::Unauthenticated => ErrorKind::Unauthorized,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::OAuthAccountConflict => ErrorKind::Conflict,
            AuthError::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            AuthError::InvalidOAuthToken(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// True for the token-state family that is reported to clients as plain `Unauthenticated`.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken
                | AuthError::ExpiredToken
                | AuthError::RevokedToken
                | AuthError::Unauthenticated
        )
    }

    /// Client-facing text. Never includes driver or provider detail.
    fn public_message(&self) -> Cow<'static, str> {
        match self {
            AuthError::Validation(msg) => Cow::Owned(msg.clone()),
            AuthError::DuplicateEmail => Cow::Borrowed("Email is already registered"),
            AuthError::InvalidCredentials => Cow::Borrowed("Invalid Credentials"),
            e if e.is_unauthenticated() => Cow::Borrowed("Unauthenticated"),
            AuthError::InvalidOAuthToken(_) => Cow::Borrowed("Google login failed"),
            AuthError::OAuthAccountConflict => {
                Cow::Borrowed("This email is already linked to another Google account")
            }
            AuthError::Forbidden => Cow::Borrowed("Admin access required"),
            AuthError::UserNotFound => Cow::Borrowed("User not found"),
            AuthError::ServiceUnavailable(_) => Cow::Borrowed("Service temporarily unavailable"),
            _ => Cow::Borrowed("Internal server error"),
        }
    }

    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.public_message());
        match self {
            e if e.is_unauthenticated() => err.with_action("Please log in again"),
            AuthError::ServiceUnavailable(_) => err.with_action("Please retry shortly"),
            _ => err,
        }
    }

    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::ServiceUnavailable(msg) => {
                tracing::error!(message = %msg, "Auth dependency unavailable");
            }
            AuthError::InvalidOAuthToken(reason) => {
                tracing::warn!(reason = %reason, "OAuth token rejected");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::OAuthAccountConflict => {
                tracing::warn!("OAuth identity conflicts with existing link");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        if classify_sqlx(&err) == DbFailure::Unavailable {
            AuthError::ServiceUnavailable(err.to_string())
        } else {
            AuthError::Database(err)
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::Validation(err.message().to_string()),
            ErrorKind::ServiceUnavailable => AuthError::ServiceUnavailable(err.to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<TaskError> for AuthError {
    fn from(err: TaskError) -> Self {
        AuthError::ServiceUnavailable(err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        match err {
            PasswordHashError::Unavailable(e) => e.into(),
            other => AuthError::Internal(other.to_string()),
        }
    }
}
