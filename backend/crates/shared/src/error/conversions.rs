//! Error conversions
//!
//! Database failure classification and the HTTP rendering of [`AppError`].

#[cfg(feature = "sqlx")]
use super::kind::ErrorKind;

// ============================================================================
// SQLx classification (feature-gated)
// ============================================================================

/// What a `sqlx::Error` means to a caller, independent of the driver's own wording.
#[cfg(feature = "sqlx")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbFailure<'a> {
    /// SQLSTATE 23505. Carries the violated constraint's name when the server reports it.
    UniqueViolation { constraint: Option<&'a str> },
    /// The database could not be reached in time, or refused for lack of resources.
    Unavailable,
    /// Anything else. Treated as an internal fault.
    Other,
}

#[cfg(feature = "sqlx")]
impl DbFailure<'_> {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbFailure::UniqueViolation { .. } => ErrorKind::Conflict,
            DbFailure::Unavailable => ErrorKind::ServiceUnavailable,
            DbFailure::Other => ErrorKind::InternalServerError,
        }
    }
}

/// Classify a driver error.
///
/// PostgreSQL codes: <https://www.postgresql.org/docs/current/errcodes-appendix.html>
#[cfg(feature = "sqlx")]
pub fn classify_sqlx(err: &sqlx::Error) -> DbFailure<'_> {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            DbFailure::Unavailable
        }
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => DbFailure::UniqueViolation {
                constraint: db_err.constraint(),
            },
            // Class 53 (insufficient resources), Class 57 (operator intervention)
            Some("53000" | "53100" | "53200" | "53300")
            | Some("57000" | "57014" | "57P01" | "57P02" | "57P03") => DbFailure::Unavailable,
            _ => DbFailure::Other,
        },
        _ => DbFailure::Other,
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for super::app_error::AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details for HTTP APIs
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
            "action": self.action(),
        });

        (status, Json(body)).into_response()
    }
}
