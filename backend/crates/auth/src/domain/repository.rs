//! Repository Traits
//!
//! Persistence interfaces. Implementations live in the infrastructure layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::user::User;
use crate::domain::value_object::{
    email::Email, google_identity::GoogleSubject, token_key::TokenKey, user_id::UserId,
};
use crate::error::AuthResult;

/// Credential store
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user. Fails with `DuplicateEmail` when the email is taken,
    /// including when a concurrent insert wins the race.
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Attach a Google identity only if the account has none yet.
    ///
    /// Returns `false` when the account was already linked (by anyone), so the
    /// caller can re-read and decide. Fails with `OAuthAccountConflict` when the
    /// subject is already linked to a different account.
    async fn link_google(
        &self,
        user_id: &UserId,
        subject: &GoogleSubject,
        picture: Option<&str>,
    ) -> AuthResult<bool>;

    /// Persist names and profile fields. Fails with `UserNotFound`.
    async fn update_profile(&self, user: &User) -> AuthResult<()>;
}

/// Deny-list of logged-out tokens
///
/// Must provide read-your-writes between `put` and `contains`.
#[trait_variant::make(RevocationStore: Send)]
pub trait LocalRevocationStore {
    /// Store the key until the **absolute** instant `expires_at`. Repeating the call
    /// is a harmless overwrite.
    async fn put(&self, key: &TokenKey, expires_at: DateTime<Utc>) -> AuthResult<()>;

    /// Single read-only lookup. Entries past their expiry are never reported.
    async fn contains(&self, key: &TokenKey) -> AuthResult<bool>;
}
