//! Auth Gateway
//!
//! Single entry point the HTTP layer talks to. Owns the injected stores, the OAuth
//! verifier, the token issuer and the hasher, and builds a use case per call.

use std::sync::Arc;

use platform::password::Argon2Hasher;

use crate::application::SessionGrant;
use crate::application::check_session::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::application::google_login::GoogleLoginUseCase;
use crate::application::login::{LoginInput, LoginUseCase};
use crate::application::logout::LogoutUseCase;
use crate::application::profile::{ProfileUpdateInput, ProfileUseCase};
use crate::application::register::{RegisterInput, RegisterUseCase};
use crate::domain::entity::session::{AuthenticatedSession, SessionStatus};
use crate::domain::entity::user::User;
use crate::domain::repository::{RevocationStore, UserRepository};
use crate::domain::services::OAuthVerifier;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;
use crate::infra::jwt::TokenIssuer;

pub struct AuthGateway<U, R, O> {
    user_repo: Arc<U>,
    revocations: Arc<R>,
    oauth: Arc<O>,
    issuer: Arc<TokenIssuer>,
    hasher: Argon2Hasher,
    config: Arc<AuthConfig>,
}

// Manual impl: the stores themselves need not be Clone
impl<U, R, O> Clone for AuthGateway<U, R, O> {
    fn clone(&self) -> Self {
        Self {
            user_repo: self.user_repo.clone(),
            revocations: self.revocations.clone(),
            oauth: self.oauth.clone(),
            issuer: self.issuer.clone(),
            hasher: self.hasher.clone(),
            config: self.config.clone(),
        }
    }
}

impl<U, R, O> AuthGateway<U, R, O>
where
    U: UserRepository,
    R: RevocationStore,
    O: OAuthVerifier,
{
    /// Fails when the signing secret is too short.
    pub fn new(user_repo: U, revocations: R, oauth: O, config: AuthConfig) -> AuthResult<Self> {
        let issuer = TokenIssuer::new(&config.token_secret)?;
        let hasher = Argon2Hasher::new(config.password_pepper.clone(), config.hashing_timeout);

        Ok(Self {
            user_repo: Arc::new(user_repo),
            revocations: Arc::new(revocations),
            oauth: Arc::new(oauth),
            issuer: Arc::new(issuer),
            hasher,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub async fn register(&self, input: RegisterInput) -> AuthResult<SessionGrant> {
        self.register_use_case().execute(input).await
    }

    pub async fn admin_register(
        &self,
        actor: &User,
        input: RegisterInput,
        role: Option<&str>,
    ) -> AuthResult<User> {
        self.register_use_case()
            .execute_as_admin(actor, input, role)
            .await
    }

    pub async fn login(&self, input: LoginInput) -> AuthResult<SessionGrant> {
        LoginUseCase::new(
            self.user_repo.clone(),
            self.issuer.clone(),
            self.hasher.clone(),
            self.config.clone(),
        )
        .execute(input)
        .await
    }

    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        LogoutUseCase::new(
            self.revocations.clone(),
            self.issuer.clone(),
            self.config.clone(),
        )
        .execute(token)
        .await
    }

    pub async fn google_login(&self, id_token: Option<String>) -> AuthResult<SessionGrant> {
        GoogleLoginUseCase::new(
            self.user_repo.clone(),
            self.oauth.clone(),
            self.issuer.clone(),
            self.hasher.clone(),
            self.config.clone(),
        )
        .execute(id_token)
        .await
    }

    /// Non-throwing check for the public `/session` endpoint.
    pub async fn session_check(&self, token: Option<&str>) -> SessionStatus {
        self.check_session_use_case().status(token).await
    }

    /// Strict check used by the session middleware.
    pub async fn authenticate(&self, token: Option<&str>) -> AuthResult<AuthenticatedSession> {
        self.check_session_use_case().authenticate(token).await
    }

    pub async fn update_profile(
        &self,
        user_id: &UserId,
        input: ProfileUpdateInput,
    ) -> AuthResult<User> {
        ProfileUseCase::new(self.user_repo.clone(), self.config.clone())
            .update(user_id, input)
            .await
    }

    fn register_use_case(&self) -> RegisterUseCase<U> {
        RegisterUseCase::new(
            self.user_repo.clone(),
            self.issuer.clone(),
            self.hasher.clone(),
            self.config.clone(),
        )
    }

    fn check_session_use_case(&self) -> CheckSessionUseCase<U, R> {
        CheckSessionUseCase::new(
            self.user_repo.clone(),
            self.revocations.clone(),
            self.issuer.clone(),
            self.config.clone(),
        )
    }
}
