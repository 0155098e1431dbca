//! Third-party identity as returned by the OAuth verifier, normalised into a
//! fixed shape right after verification.

use derive_more::Display;
use kernel::error::app_error::{AppError, AppResult};

use super::email::Email;

const SUBJECT_MAX_LENGTH: usize = 255;
const PICTURE_MAX_LENGTH: usize = 2048;

/// Google's stable account identifier (`sub` claim).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct GoogleSubject(String);

impl GoogleSubject {
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let raw = raw.into();
        if raw.is_empty()
            || raw.len() > SUBJECT_MAX_LENGTH
            || raw.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(AppError::bad_request("Invalid identity subject"));
        }
        Ok(Self(raw))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub email: Email,
    pub name: Option<String>,
    pub subject: GoogleSubject,
    pub picture: Option<String>,
}

impl GoogleIdentity {
    /// Blank optional fields become `None`; pictures must be https URLs.
    pub fn new(
        email: &str,
        name: Option<&str>,
        subject: &str,
        picture: Option<&str>,
    ) -> AppResult<Self> {
        let email = Email::new(email)?;
        let subject = GoogleSubject::new(subject)?;

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let picture = picture
            .map(str::trim)
            .filter(|p| p.starts_with("https://") && p.len() <= PICTURE_MAX_LENGTH)
            .map(str::to_string);

        Ok(Self {
            email,
            name,
            subject,
            picture,
        })
    }
}
