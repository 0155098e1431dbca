//! Password Hashing and Verification
//!
//! NIST SP 800-63B style password handling:
//! - Argon2id hashing (memory-hard, OWASP parameters)
//! - NFKC normalisation and length limits counted in code points
//! - Zeroization of clear text on drop
//! - [`Argon2Hasher`] runs the expensive work on the blocking pool under a deadline

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto;
use crate::task::{TaskError, spawn_blocking_bounded};

// ============================================================================
// Constants (NIST SP 800-63B)
// ============================================================================

/// NIST: SHALL be at least 8
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// NIST: SHOULD permit at least 64
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    /// The hashing worker missed its deadline or died.
    #[error("Password hasher unavailable: {0}")]
    Unavailable(#[from] TaskError),
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password, erased from memory on drop.
///
/// Not `Clone`, and `Debug` is redacted.
///
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let password = ClearTextPassword::new("password123".to_string()).unwrap();
/// assert_eq!(format!("{password:?}"), "ClearTextPassword(\"[REDACTED]\")");
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Validate and normalise (NFKC) a user-supplied password.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let raw = Zeroizing::new(raw);
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // NIST: count code points, not bytes
        let char_count = normalized.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        // Control characters other than space, tab, newline
        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != ' ' && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(Self(normalized))
    }

    /// A random password nobody knows. Used for accounts that sign in through a
    /// third party and must never be reachable by password login.
    pub fn generate() -> Self {
        Self(crypto::random_token(32))
    }

    #[cfg(test)]
    pub fn new_unchecked(raw: String) -> Self {
        Self(raw)
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
        let mut bytes = self.0.as_bytes().to_vec();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        Zeroizing::new(bytes)
    }

    /// Hash with Argon2id (m=19 MiB, t=2, p=1) and a fresh 128-bit salt.
    ///
    /// Blocking and slow; async callers go through [`Argon2Hasher`].
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(OsRng);

        let hash = Argon2::default()
            .hash_password(&self.peppered(pepper), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2id hash in PHC string format (algorithm, version, params, salt, digest).
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Argon2 compares digests in constant time.
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&self.hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(&password.peppered(pepper), &parsed_hash)
            .is_ok()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Async hasher
// ============================================================================

/// One-way hash + verify for credentials, executed on tokio's blocking pool.
#[derive(Clone)]
pub struct Argon2Hasher {
    pepper: Option<Arc<[u8]>>,
    timeout: Duration,
}

impl Argon2Hasher {
    pub fn new(pepper: Option<Vec<u8>>, timeout: Duration) -> Self {
        Self {
            pepper: pepper.map(Arc::from),
            timeout,
        }
    }

    pub async fn hash(&self, password: ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        let pepper = self.pepper.clone();
        spawn_blocking_bounded(self.timeout, move || password.hash(pepper.as_deref())).await?
    }

    pub async fn verify(
        &self,
        password: ClearTextPassword,
        hashed: HashedPassword,
    ) -> Result<bool, PasswordHashError> {
        let pepper = self.pepper.clone();
        let matched = spawn_blocking_bounded(self.timeout, move || {
            hashed.verify(&password, pepper.as_deref())
        })
        .await?;
        Ok(matched)
    }
}

impl fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
