//! Register Use Case
//!
//! Creates a password account. Self-registration always yields role `user` and a
//! session; admin provisioning picks the role and issues nothing.

use std::sync::Arc;

use platform::password::Argon2Hasher;

use crate::application::SessionGrant;
use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    person_name::PersonName,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenIssuer;

/// Register input
pub struct RegisterInput {
    pub first_name: String,
    pub email_id: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    issuer: Arc<TokenIssuer>,
    hasher: Argon2Hasher,
    config: Arc<AuthConfig>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        issuer: Arc<TokenIssuer>,
        hasher: Argon2Hasher,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            issuer,
            hasher,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<SessionGrant> {
        let user = self.create(input, UserRole::User).await?;
        let token = self
            .issuer
            .sign(&user.session_identity(), self.config.token_ttl)?;

        tracing::info!(user_id = %user.user_id, "User registered");

        Ok(SessionGrant { user, token })
    }

    /// Admin-only provisioning. The caller's own session is left untouched.
    ///
    /// `role` is `user` or `admin`; absent means `user`.
    pub async fn execute_as_admin(
        &self,
        actor: &User,
        input: RegisterInput,
        role: Option<&str>,
    ) -> AuthResult<User> {
        if !actor.user_role.is_admin() {
            return Err(AuthError::Forbidden);
        }

        let role = match role.map(str::trim) {
            None | Some("") => UserRole::User,
            Some(code) => UserRole::from_code(&code.to_ascii_lowercase()).ok_or_else(|| {
                AuthError::Validation("Role must be either 'user' or 'admin'".to_string())
            })?,
        };

        let user = self.create(input, role).await?;

        tracing::info!(
            user_id = %user.user_id,
            role = %role,
            provisioned_by = %actor.user_id,
            "User provisioned by admin"
        );

        Ok(user)
    }

    async fn create(&self, input: RegisterInput, role: UserRole) -> AuthResult<User> {
        let first_name = PersonName::new(&input.first_name, "First name")?;
        let email = Email::new(input.email_id)?;
        let password = RawPassword::new(input.password)?;

        let timeout = self.config.dependency_timeout;

        // Fast path only; the unique index settles concurrent registrations
        if within(timeout, self.user_repo.exists_by_email(&email)).await? {
            return Err(AuthError::DuplicateEmail);
        }

        let hashed = self.hasher.hash(password.into_inner()).await?;
        let user = User::register(first_name, email, UserPassword::from(hashed), role);

        within(timeout, self.user_repo.create(&user)).await?;

        Ok(user)
    }
}
