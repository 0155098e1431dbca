//! In-process stores with the same contracts as the PostgreSQL ones.
//!
//! Used by the test suite and for running the router without a database.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::{RevocationStore, UserRepository};
use crate::domain::value_object::{
    email::Email, google_identity::GoogleSubject, token_key::TokenKey, user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::DuplicateEmail);
        }
        if user.google_id.is_some() && users.values().any(|u| u.google_id == user.google_id) {
            return Err(AuthError::OAuthAccountConflict);
        }

        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.users.read().await.values().any(|u| &u.email == email))
    }

    async fn link_google(
        &self,
        user_id: &UserId,
        subject: &GoogleSubject,
        picture: Option<&str>,
    ) -> AuthResult<bool> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|u| &u.user_id != user_id && u.google_id.as_ref() == Some(subject))
        {
            return Err(AuthError::OAuthAccountConflict);
        }

        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };
        if user.google_id.is_some() {
            return Ok(false);
        }

        user.google_id = Some(subject.clone());
        user.is_google_auth = true;
        if let Some(picture) = picture {
            user.profile.profile_pic = Some(picture.to_string());
        }
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_profile(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&user.user_id).ok_or(AuthError::UserNotFound)?;

        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.profile.age = user.profile.age;
        stored.profile.bio = user.profile.bio.clone();
        stored.profile.github = user.profile.github.clone();
        stored.profile.linkedin = user.profile.linkedin.clone();
        stored.profile.leetcode = user.profile.leetcode.clone();
        stored.updated_at = user.updated_at;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryRevocationStore {
    entries: Arc<RwLock<HashMap<TokenKey, DateTime<Utc>>>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored expiry for a key, including entries that have already lapsed.
    pub async fn expiry_of(&self, key: &TokenKey) -> Option<DateTime<Utc>> {
        self.entries.read().await.get(key).copied()
    }

    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        before - entries.len()
    }
}

impl RevocationStore for MemoryRevocationStore {
    async fn put(&self, key: &TokenKey, expires_at: DateTime<Utc>) -> AuthResult<()> {
        self.entries.write().await.insert(*key, expires_at);
        Ok(())
    }

    async fn contains(&self, key: &TokenKey) -> AuthResult<bool> {
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .is_some_and(|expires_at| *expires_at > Utc::now()))
    }
}
