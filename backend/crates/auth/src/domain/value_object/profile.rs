//! Optional profile fields.

use derive_more::Display;
use kernel::error::app_error::{AppError, AppResult};

pub const AGE_MIN: i64 = 6;
pub const AGE_MAX: i64 = 120;
pub const BIO_MAX_LENGTH: usize = 500;
pub const LINK_MAX_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub struct Age(i16);

impl Age {
    pub fn new(value: i64) -> AppResult<Self> {
        if !(AGE_MIN..=AGE_MAX).contains(&value) {
            return Err(AppError::bad_request(format!(
                "Age must be between {AGE_MIN} and {AGE_MAX}"
            )));
        }
        Ok(Self(value as i16))
    }

    pub fn from_db(value: i16) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i16 {
        self.0
    }
}

/// Free text with a per-field length cap (bio, profile handles and links).
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub struct ProfileText(String);

impl ProfileText {
    pub fn new(raw: impl AsRef<str>, field: &'static str, max_len: usize) -> AppResult<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.chars().count() > max_len {
            return Err(AppError::bad_request(format!(
                "{field} must be at most {max_len} characters"
            )));
        }
        if trimmed
            .chars()
            .any(|c| c.is_control() && c != '\n' && c != '\t')
        {
            return Err(AppError::bad_request(format!(
                "{field} contains invalid characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn bio(raw: impl AsRef<str>) -> AppResult<Self> {
        Self::new(raw, "Bio", BIO_MAX_LENGTH)
    }

    pub fn link(raw: impl AsRef<str>, field: &'static str) -> AppResult<Self> {
        Self::new(raw, field, LINK_MAX_LENGTH)
    }

    pub fn from_db(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
