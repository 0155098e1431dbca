//! User Entity
//!
//! A registered account: credentials, role, optional Google link and profile.

use chrono::{DateTime, Utc};

use crate::domain::entity::session::SessionIdentity;
use crate::domain::value_object::{
    email::Email,
    google_identity::{GoogleIdentity, GoogleSubject},
    person_name::PersonName,
    profile::{Age, ProfileText},
    user_id::UserId,
    user_password::UserPassword,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub profile_pic: Option<String>,
    pub age: Option<Age>,
    pub bio: Option<ProfileText>,
    pub github: Option<ProfileText>,
    pub linkedin: Option<ProfileText>,
    pub leetcode: Option<ProfileText>,
}

/// Validated partial update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub age: Option<Age>,
    pub bio: Option<ProfileText>,
    pub github: Option<ProfileText>,
    pub linkedin: Option<ProfileText>,
    pub leetcode: Option<ProfileText>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The Google identity was attached just now and must be persisted
    Linked,
    /// The account already carries this exact identity
    AlreadyLinked,
}

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub first_name: PersonName,
    pub last_name: Option<PersonName>,
    /// Unique; the login key
    pub email: Email,
    pub password: UserPassword,
    pub user_role: UserRole,
    pub google_id: Option<GoogleSubject>,
    pub is_google_auth: bool,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Password account
    pub fn register(
        first_name: PersonName,
        email: Email,
        password: UserPassword,
        user_role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            first_name,
            last_name: None,
            email,
            password,
            user_role,
            google_id: None,
            is_google_auth: false,
            profile: UserProfile::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Account created at first Google sign-in. `placeholder` is the hash of a random
    /// secret so the account is never reachable through password login.
    pub fn from_google(identity: &GoogleIdentity, placeholder: UserPassword) -> Self {
        let first_name =
            PersonName::from_provider(identity.name.as_deref(), identity.email.local_part());
        let mut user = Self::register(
            first_name,
            identity.email.clone(),
            placeholder,
            UserRole::User,
        );
        user.google_id = Some(identity.subject.clone());
        user.is_google_auth = true;
        user.profile.profile_pic = identity.picture.clone();
        user
    }

    /// Attach a Google identity. The first link wins: an account already linked to a
    /// different subject is a conflict. Never touches the role.
    pub fn link_google(&mut self, identity: &GoogleIdentity) -> AuthResult<LinkOutcome> {
        match &self.google_id {
            Some(existing) if existing == &identity.subject => Ok(LinkOutcome::AlreadyLinked),
            Some(_) => Err(AuthError::OAuthAccountConflict),
            None => {
                self.google_id = Some(identity.subject.clone());
                self.is_google_auth = true;
                if identity.picture.is_some() {
                    self.profile.profile_pic = identity.picture.clone();
                }
                self.updated_at = Utc::now();
                Ok(LinkOutcome::Linked)
            }
        }
    }

    pub fn apply_profile_update(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            first_name,
            last_name,
            age,
            bio,
            github,
            linkedin,
            leetcode,
        } = update;

        if let Some(first_name) = first_name {
            self.first_name = first_name;
        }
        if last_name.is_some() {
            self.last_name = last_name;
        }
        if age.is_some() {
            self.profile.age = age;
        }
        if bio.is_some() {
            self.profile.bio = bio;
        }
        if github.is_some() {
            self.profile.github = github;
        }
        if linkedin.is_some() {
            self.profile.linkedin = linkedin;
        }
        if leetcode.is_some() {
            self.profile.leetcode = leetcode;
        }
        self.updated_at = Utc::now();
    }

    pub fn session_identity(&self) -> SessionIdentity {
        SessionIdentity {
            user_id: self.user_id,
            email: self.email.clone(),
            user_role: self.user_role,
        }
    }
}
