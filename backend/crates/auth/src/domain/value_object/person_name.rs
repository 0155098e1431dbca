//! Person name (first / last name) value object.

use derive_more::Display;
use kernel::error::app_error::{AppError, AppResult};
use unicode_normalization::UnicodeNormalization;

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub struct PersonName(String);

impl PersonName {
    /// NFKC-normalise, trim, and check the length in code points.
    pub fn new(raw: impl AsRef<str>, field: &'static str) -> AppResult<Self> {
        let normalized: String = raw.as_ref().nfkc().collect();
        let trimmed = normalized.trim();

        if trimmed.chars().any(char::is_control) {
            return Err(AppError::bad_request(format!(
                "{field} contains invalid characters"
            )));
        }

        let len = trimmed.chars().count();
        if len < NAME_MIN_LENGTH || len > NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "{field} must be between {NAME_MIN_LENGTH} and {NAME_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Best-effort name for an identity-provider profile. The provider's display
    /// name is used when it passes validation, otherwise the email's local part,
    /// otherwise a fixed fallback.
    pub fn from_provider(display_name: Option<&str>, email_local_part: &str) -> Self {
        display_name
            .and_then(|name| Self::new(name, "Name").ok())
            .or_else(|| {
                let truncated: String = email_local_part.chars().take(NAME_MAX_LENGTH).collect();
                Self::new(truncated, "Name").ok()
            })
            .unwrap_or_else(|| Self("User".to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
