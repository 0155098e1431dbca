//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::{DbFailure, classify_sqlx};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::user::{User, UserProfile};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    google_identity::GoogleSubject,
    person_name::PersonName,
    profile::{Age, ProfileText},
    user_id::UserId,
    user_password::UserPassword,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

const EMAIL_CONSTRAINT: &str = "users_email_id_key";
const GOOGLE_ID_CONSTRAINT: &str = "users_google_id_key";

const USER_COLUMNS: &str = r#"
    user_id,
    first_name,
    last_name,
    email_id,
    password_hash,
    user_role,
    google_id,
    is_google_auth,
    profile_pic,
    age,
    bio,
    github,
    linkedin,
    leetcode,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed credential store
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique violations carry the business meaning; everything else goes through the
/// generic sqlx conversion.
fn map_write_error(err: sqlx::Error) -> AuthError {
    let business = match classify_sqlx(&err) {
        DbFailure::UniqueViolation {
            constraint: Some(EMAIL_CONSTRAINT),
        } => Some(AuthError::DuplicateEmail),
        DbFailure::UniqueViolation {
            constraint: Some(GOOGLE_ID_CONSTRAINT),
        } => Some(AuthError::OAuthAccountConflict),
        _ => None,
    };
    business.unwrap_or_else(|| err.into())
}

impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let profile = &user.profile;

        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                first_name,
                last_name,
                email_id,
                password_hash,
                user_role,
                google_id,
                is_google_auth,
                profile_pic,
                age,
                bio,
                github,
                linkedin,
                leetcode,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_ref().map(|n| n.as_str()))
        .bind(user.email.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.user_role.id())
        .bind(user.google_id.as_ref().map(|g| g.as_str()))
        .bind(user.is_google_auth)
        .bind(profile.profile_pic.as_deref())
        .bind(profile.age.map(|a| a.value()))
        .bind(profile.bio.as_ref().map(|t| t.as_str()))
        .bind(profile.github.as_ref().map(|t| t.as_str()))
        .bind(profile.linkedin.as_ref().map(|t| t.as_str()))
        .bind(profile.leetcode.as_ref().map(|t| t.as_str()))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email_id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email_id = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn link_google(
        &self,
        user_id: &UserId,
        subject: &GoogleSubject,
        picture: Option<&str>,
    ) -> AuthResult<bool> {
        // Conditional on google_id IS NULL: concurrent linkers cannot overwrite each other
        let result = sqlx::query(
            r#"
            UPDATE users
            SET google_id = $2,
                is_google_auth = TRUE,
                profile_pic = COALESCE($3, profile_pic),
                updated_at = NOW()
            WHERE user_id = $1 AND google_id IS NULL
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(subject.as_str())
        .bind(picture)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_profile(&self, user: &User) -> AuthResult<()> {
        let profile = &user.profile;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2,
                last_name = $3,
                age = $4,
                bio = $5,
                github = $6,
                linkedin = $7,
                leetcode = $8,
                updated_at = $9
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_ref().map(|n| n.as_str()))
        .bind(profile.age.map(|a| a.value()))
        .bind(profile.bio.as_ref().map(|t| t.as_str()))
        .bind(profile.github.as_ref().map(|t| t.as_str()))
        .bind(profile.linkedin.as_ref().map(|t| t.as_str()))
        .bind(profile.leetcode.as_ref().map(|t| t.as_str()))
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    first_name: String,
    last_name: Option<String>,
    email_id: String,
    password_hash: String,
    user_role: i16,
    google_id: Option<String>,
    is_google_auth: bool,
    profile_pic: Option<String>,
    age: Option<i16>,
    bio: Option<String>,
    github: Option<String>,
    linkedin: Option<String>,
    leetcode: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let password = UserPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password_hash: {}", e)))?;

        let user_role = UserRole::from_id(self.user_role).ok_or_else(|| {
            AuthError::Internal(format!("Invalid user_role: {}", self.user_role))
        })?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            first_name: PersonName::from_db(self.first_name),
            last_name: self.last_name.map(PersonName::from_db),
            email: Email::from_db(self.email_id),
            password,
            user_role,
            google_id: self.google_id.map(GoogleSubject::from_db),
            is_google_auth: self.is_google_auth,
            profile: UserProfile {
                profile_pic: self.profile_pic,
                age: self.age.map(Age::from_db),
                bio: self.bio.map(ProfileText::from_db),
                github: self.github.map(ProfileText::from_db),
                linkedin: self.linkedin.map(ProfileText::from_db),
                leetcode: self.leetcode.map(ProfileText::from_db),
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
