//! User Password Value Object
//!
//! Domain wrapper over `platform::password`. Hashing itself is asynchronous and
//! happens in the application layer through `platform::password::Argon2Hasher`.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Password as typed by the user. Zeroized on drop.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate user input (NIST length rules, NFKC, no control characters).
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::TooShort { min, .. } => {
                AppError::bad_request(format!("Password must be at least {} characters", min))
                    .with_action("Please choose a longer password")
            }
            PasswordPolicyError::TooLong { max, .. } => {
                AppError::bad_request(format!("Password must be at most {} characters", max))
                    .with_action("Please choose a shorter password")
            }
            PasswordPolicyError::EmptyOrWhitespace => AppError::bad_request("Password is required"),
            PasswordPolicyError::InvalidCharacter => {
                AppError::bad_request("Password contains invalid characters")
            }
        })?;

        Ok(Self(clear_text))
    }

    /// Random secret for accounts created through OAuth. Never shown to anyone.
    pub fn placeholder() -> Self {
        Self(ClearTextPassword::generate())
    }

    pub(crate) fn into_inner(self) -> ClearTextPassword {
        self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Argon2id PHC string as stored in `users.password_hash`.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_phc_string(phc_string: impl Into<String>) -> AppResult<Self> {
        let hashed = HashedPassword::from_phc_string(phc_string)
            .map_err(|_| AppError::internal("Invalid password hash in database"))?;

        Ok(Self(hashed))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub(crate) fn hashed(&self) -> &HashedPassword {
        &self.0
    }
}

impl From<HashedPassword> for UserPassword {
    fn from(hashed: HashedPassword) -> Self {
        Self(hashed)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
