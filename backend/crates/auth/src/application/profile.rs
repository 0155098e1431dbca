//! Profile Use Case

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::entity::user::{ProfileUpdate, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    person_name::PersonName,
    profile::{Age, ProfileText},
    user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

/// Raw partial update; `None` fields are left as they are.
#[derive(Debug, Default)]
pub struct ProfileUpdateInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i64>,
    pub bio: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub leetcode: Option<String>,
}

impl ProfileUpdateInput {
    fn validate(self) -> AuthResult<ProfileUpdate> {
        Ok(ProfileUpdate {
            first_name: self
                .first_name
                .map(|v| PersonName::new(v, "First name"))
                .transpose()?,
            last_name: self
                .last_name
                .map(|v| PersonName::new(v, "Last name"))
                .transpose()?,
            age: self.age.map(Age::new).transpose()?,
            bio: self.bio.map(ProfileText::bio).transpose()?,
            github: self
                .github
                .map(|v| ProfileText::link(v, "GitHub"))
                .transpose()?,
            linkedin: self
                .linkedin
                .map(|v| ProfileText::link(v, "LinkedIn"))
                .transpose()?,
            leetcode: self
                .leetcode
                .map(|v| ProfileText::link(v, "LeetCode"))
                .transpose()?,
        })
    }
}

pub struct ProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> ProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn update(&self, user_id: &UserId, input: ProfileUpdateInput) -> AuthResult<User> {
        let update = input.validate()?;
        let timeout = self.config.dependency_timeout;

        let mut user = within(timeout, self.user_repo.find_by_id(user_id))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        user.apply_profile_update(update);
        within(timeout, self.user_repo.update_profile(&user)).await?;

        tracing::info!(user_id = %user.user_id, "Profile updated");
        Ok(user)
    }
}
