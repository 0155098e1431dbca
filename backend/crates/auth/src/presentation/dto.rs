//! API DTOs (Data Transfer Objects)
//!
//! Field names follow the existing frontend contract (`emailId`, `_id`, camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{LoginInput, ProfileUpdateInput, RegisterInput};
use crate::domain::entity::user::User;

// ============================================================================
// Requests
// ============================================================================

/// Missing fields deserialize as empty and fail validation with a 400.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub first_name: String,
    pub email_id: String,
    pub password: String,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        Self {
            first_name: req.first_name,
            email_id: req.email_id,
            password: req.password,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub email_id: String,
    pub password: String,
}

impl From<LoginRequest> for LoginInput {
    fn from(req: LoginRequest) -> Self {
        Self {
            email_id: req.email_id,
            password: req.password,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleLoginRequest {
    pub token_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminRegisterRequest {
    pub first_name: String,
    pub email_id: String,
    pub password: String,
    /// `user` or `admin`; defaults to `user`
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i64>,
    pub bio: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub leetcode: Option<String>,
}

impl From<ProfileUpdateRequest> for ProfileUpdateInput {
    fn from(req: ProfileUpdateRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            age: req.age,
            bio: req.bio,
            github: req.github,
            linkedin: req.linkedin,
            leetcode: req.leetcode,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Public view of a user returned by the login family and `/check`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub first_name: String,
    pub email_id: String,
    #[serde(rename = "_id")]
    pub id: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.as_str().to_string(),
            email_id: user.email.as_str().to_string(),
            id: user.user_id.to_string(),
            role: user.user_role.code().to_string(),
            profile_pic: user.profile.profile_pic.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserView,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: Option<UserView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Full profile, never including the password hash or Google subject.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email_id: String,
    pub role: String,
    pub is_google_auth: bool,
    pub profile_pic: Option<String>,
    pub age: Option<i16>,
    pub bio: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub leetcode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        let profile = &user.profile;
        Self {
            id: user.user_id.to_string(),
            first_name: user.first_name.as_str().to_string(),
            last_name: user.last_name.as_ref().map(|n| n.as_str().to_string()),
            email_id: user.email.as_str().to_string(),
            role: user.user_role.code().to_string(),
            is_google_auth: user.is_google_auth,
            profile_pic: profile.profile_pic.clone(),
            age: profile.age.map(|a| a.value()),
            bio: profile.bio.as_ref().map(|t| t.as_str().to_string()),
            github: profile.github.as_ref().map(|t| t.as_str().to_string()),
            linkedin: profile.linkedin.as_ref().map(|t| t.as_str().to_string()),
            leetcode: profile.leetcode.as_ref().map(|t| t.as_str().to_string()),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user: ProfileView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdateResponse {
    pub message: String,
    pub user: ProfileView,
}
