//! Cross-layer scenarios on the in-memory stores.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::{AuthConfig, AuthGateway, LoginInput, ProfileUpdateInput, RegisterInput};
use crate::domain::entity::user::User;
use crate::domain::repository::{RevocationStore, UserRepository};
use crate::domain::services::OAuthVerifier;
use crate::domain::value_object::{
    email::Email,
    google_identity::{GoogleIdentity, GoogleSubject},
    token_key::TokenKey,
    user_id::UserId,
};
use crate::error::{AuthError, AuthResult};
use crate::infra::memory::{MemoryRevocationStore, MemoryUserRepository};

const CLIENT_ID: &str = "client-1";

/// Maps opaque test tokens to identities; anything else is rejected.
#[derive(Clone, Default)]
struct StaticOAuthVerifier {
    identities: HashMap<String, GoogleIdentity>,
}

impl StaticOAuthVerifier {
    fn with(mut self, token: &str, email: &str, subject: &str) -> Self {
        let identity = GoogleIdentity::new(
            email,
            Some("Ann Google"),
            subject,
            Some("https://lh3.googleusercontent.com/a/ann"),
        )
        .unwrap();
        self.identities.insert(token.to_string(), identity);
        self
    }
}

impl OAuthVerifier for StaticOAuthVerifier {
    async fn verify(&self, id_token: &str, expected_audience: &str) -> AuthResult<GoogleIdentity> {
        if expected_audience != CLIENT_ID {
            return Err(AuthError::InvalidOAuthToken("audience mismatch".into()));
        }
        self.identities
            .get(id_token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidOAuthToken("unknown token".into()))
    }
}

/// Revocation store whose backend is always down.
#[derive(Clone, Default)]
struct DownRevocationStore;

impl RevocationStore for DownRevocationStore {
    async fn put(&self, _key: &TokenKey, _expires_at: chrono::DateTime<chrono::Utc>) -> AuthResult<()> {
        Err(AuthError::ServiceUnavailable("connection refused".into()))
    }

    async fn contains(&self, _key: &TokenKey) -> AuthResult<bool> {
        Err(AuthError::ServiceUnavailable("connection refused".into()))
    }
}

/// Credential store whose email lookups miss a row a concurrent request just
/// inserted, for the first `misses` calls.
#[derive(Clone)]
struct LaggingEmailLookup {
    inner: MemoryUserRepository,
    misses: Arc<AtomicUsize>,
}

impl LaggingEmailLookup {
    fn new(inner: MemoryUserRepository, misses: usize) -> Self {
        Self {
            inner,
            misses: Arc::new(AtomicUsize::new(misses)),
        }
    }
}

/// Credential store whose email lookups return the row as it was before a
/// concurrent Google link landed.
#[derive(Clone)]
struct StaleLinkRead {
    inner: MemoryUserRepository,
}

impl UserRepository for LaggingEmailLookup {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.inner.create(user).await
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        self.inner.find_by_id(user_id).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let missed = self
            .misses
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if missed {
            return Ok(None);
        }
        self.inner.find_by_email(email).await
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        self.inner.exists_by_email(email).await
    }

    async fn link_google(
        &self,
        user_id: &UserId,
        subject: &GoogleSubject,
        picture: Option<&str>,
    ) -> AuthResult<bool> {
        self.inner.link_google(user_id, subject, picture).await
    }

    async fn update_profile(&self, user: &User) -> AuthResult<()> {
        self.inner.update_profile(user).await
    }
}

impl UserRepository for StaleLinkRead {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.inner.create(user).await
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        self.inner.find_by_id(user_id).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let user = self.inner.find_by_email(email).await?;
        Ok(user.map(|mut u| {
            u.google_id = None;
            u.is_google_auth = false;
            u
        }))
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        self.inner.exists_by_email(email).await
    }

    async fn link_google(
        &self,
        user_id: &UserId,
        subject: &GoogleSubject,
        picture: Option<&str>,
    ) -> AuthResult<bool> {
        self.inner.link_google(user_id, subject, picture).await
    }

    async fn update_profile(&self, user: &User) -> AuthResult<()> {
        self.inner.update_profile(user).await
    }
}

fn config() -> AuthConfig {
    AuthConfig {
        oauth_client_id: CLIENT_ID.to_string(),
        hashing_timeout: Duration::from_secs(60),
        ..AuthConfig::development()
    }
}

fn oauth() -> StaticOAuthVerifier {
    StaticOAuthVerifier::default()
        .with("google-ann", "ann@x.com", "g-ann")
        .with("google-ann-other", "ann@x.com", "g-impostor")
        .with("google-bob", "bob@x.com", "g-bob")
}

type Gateway = AuthGateway<MemoryUserRepository, MemoryRevocationStore, StaticOAuthVerifier>;

struct TestBed {
    gateway: Gateway,
    users: MemoryUserRepository,
    revocations: MemoryRevocationStore,
}

fn test_bed() -> TestBed {
    let users = MemoryUserRepository::new();
    let revocations = MemoryRevocationStore::new();
    let gateway = AuthGateway::new(users.clone(), revocations.clone(), oauth(), config()).unwrap();
    TestBed {
        gateway,
        users,
        revocations,
    }
}

fn ann() -> RegisterInput {
    RegisterInput {
        first_name: "Ann".to_string(),
        email_id: "ann@x.com".to_string(),
        password: "password123".to_string(),
    }
}

fn login_input(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email_id: email.to_string(),
        password: password.to_string(),
    }
}

mod gateway {
    use super::*;
    use crate::domain::value_object::{
        person_name::PersonName, user_password::UserPassword, user_role::UserRole,
    };
    use crate::infra::jwt::TokenIssuer;
    use chrono::Utc;
    use platform::password::ClearTextPassword;

    #[tokio::test]
    async fn test_register_then_login_binds_subject() {
        let bed = test_bed();
        let registered = bed.gateway.register(ann()).await.unwrap();
        assert_eq!(registered.user.user_role, UserRole::User);

        let grant = bed
            .gateway
            .login(login_input("ann@x.com", "password123"))
            .await
            .unwrap();

        let issuer = TokenIssuer::new(&bed.gateway.config().token_secret).unwrap();
        let claims = issuer.verify(&grant.token.token).unwrap();
        assert_eq!(claims.identity.user_id, registered.user.user_id);
        assert_eq!(claims.identity.email.as_str(), "ann@x.com");
    }

    #[tokio::test]
    async fn test_token_expiry_is_canonical_ttl() {
        let bed = test_bed();
        let grant = bed.gateway.register(ann()).await.unwrap();
        let remaining = grant.token.expires_at - Utc::now();
        assert!(remaining > chrono::Duration::days(7) - chrono::Duration::minutes(1));
        assert!(remaining <= chrono::Duration::days(7));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let bed = test_bed();
        let cases = [
            RegisterInput {
                first_name: "A".into(),
                ..ann()
            },
            RegisterInput {
                email_id: "not-an-email".into(),
                ..ann()
            },
            RegisterInput {
                password: "short".into(),
                ..ann()
            },
        ];
        for input in cases {
            let err = bed.gateway.register(input).await.unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)), "{err:?}");
            assert_eq!(err.status_code(), 400);
        }
        assert_eq!(bed.users.len().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_registration() {
        let bed = test_bed();
        let other = RegisterInput {
            first_name: "Annie".into(),
            email_id: "ANN@x.com".into(),
            ..ann()
        };

        let (a, b) = tokio::join!(bed.gateway.register(ann()), bed.gateway.register(other));

        let outcomes = [a.is_ok(), b.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
        let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
        assert!(matches!(loser, AuthError::DuplicateEmail));
        assert_eq!(bed.users.len().await, 1);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let bed = test_bed();
        bed.gateway.register(ann()).await.unwrap();

        let wrong_password = bed
            .gateway
            .login(login_input("ann@x.com", "password124"))
            .await
            .unwrap_err()
            .to_app_error();
        let unknown_email = bed
            .gateway
            .login(login_input("nobody@x.com", "password123"))
            .await
            .unwrap_err()
            .to_app_error();
        let malformed = bed
            .gateway
            .login(login_input("", ""))
            .await
            .unwrap_err()
            .to_app_error();

        for err in [&unknown_email, &malformed] {
            assert_eq!(err.status_code(), wrong_password.status_code());
            assert_eq!(err.message(), wrong_password.message());
        }
        assert_eq!(wrong_password.status_code(), 401);
    }

    #[tokio::test]
    async fn test_logout_revokes_before_expiry() {
        let bed = test_bed();
        let grant = bed.gateway.register(ann()).await.unwrap();
        let token = grant.token.token.as_str();

        assert!(bed.gateway.session_check(Some(token)).await.authenticated());

        bed.gateway.logout(token).await.unwrap();

        assert!(!bed.gateway.session_check(Some(token)).await.authenticated());
        assert!(matches!(
            bed.gateway.authenticate(Some(token)).await,
            Err(AuthError::RevokedToken)
        ));

        // Idempotent
        bed.gateway.logout(token).await.unwrap();
    }

    #[tokio::test]
    async fn test_revocation_entry_expires_with_token() {
        let bed = test_bed();
        let grant = bed.gateway.register(ann()).await.unwrap();
        bed.gateway.logout(&grant.token.token).await.unwrap();

        let stored = bed
            .revocations
            .expiry_of(&TokenKey::from_token(&grant.token.token))
            .await
            .unwrap();
        assert_eq!(stored.timestamp(), grant.token.expires_at.timestamp());
    }

    #[tokio::test]
    async fn test_logout_of_expired_token_writes_nothing() {
        let bed = test_bed();
        let grant = bed.gateway.register(ann()).await.unwrap();

        let issuer = TokenIssuer::new(&bed.gateway.config().token_secret).unwrap();
        let expired = issuer
            .sign_at(
                &grant.user.session_identity(),
                Utc::now() - chrono::Duration::hours(2),
                Duration::from_secs(3600),
            )
            .unwrap();

        bed.gateway.logout(&expired.token).await.unwrap();
        assert!(
            bed.revocations
                .expiry_of(&TokenKey::from_token(&expired.token))
                .await
                .is_none()
        );
        assert!(matches!(
            bed.gateway.authenticate(Some(&expired.token)).await,
            Err(AuthError::ExpiredToken)
        ));
    }

    #[tokio::test]
    async fn test_token_at_its_exp_second_stays_out_after_logout() {
        let bed = test_bed();
        let grant = bed.gateway.register(ann()).await.unwrap();

        let issuer = TokenIssuer::new(&bed.gateway.config().token_secret).unwrap();
        let this_second = chrono::DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap();
        let boundary = issuer
            .sign_at(
                &grant.user.session_identity(),
                this_second - chrono::Duration::hours(1),
                Duration::from_secs(3600),
            )
            .unwrap();

        bed.gateway.logout(&boundary.token).await.unwrap();
        assert!(matches!(
            bed.gateway.authenticate(Some(&boundary.token)).await,
            Err(AuthError::ExpiredToken)
        ));
        assert!(!bed.gateway.session_check(Some(&boundary.token)).await.authenticated());
    }

    #[tokio::test]
    async fn test_tampered_and_missing_tokens() {
        let bed = test_bed();
        let grant = bed.gateway.register(ann()).await.unwrap();
        let mut tampered = grant.token.token.clone();
        tampered.push('x');

        assert!(matches!(
            bed.gateway.authenticate(Some(&tampered)).await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            bed.gateway.authenticate(None).await,
            Err(AuthError::Unauthenticated)
        ));
        assert!(!bed.gateway.session_check(Some(&tampered)).await.authenticated());
        assert!(!bed.gateway.session_check(None).await.authenticated());
    }

    #[tokio::test]
    async fn test_google_login_links_existing_account() {
        let bed = test_bed();
        let registered = bed.gateway.register(ann()).await.unwrap();

        let first = bed
            .gateway
            .google_login(Some("google-ann".into()))
            .await
            .unwrap();
        let second = bed
            .gateway
            .google_login(Some("google-ann".into()))
            .await
            .unwrap();

        assert_eq!(first.user.user_id, registered.user.user_id);
        assert_eq!(second.user.user_id, registered.user.user_id);
        assert_eq!(bed.users.len().await, 1);

        let stored = bed
            .users
            .find_by_id(&registered.user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_google_auth);
        assert_eq!(stored.google_id.as_ref().map(|g| g.as_str()), Some("g-ann"));

        // Password login keeps working on a linked account
        assert!(
            bed.gateway
                .login(login_input("ann@x.com", "password123"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_google_second_identity_conflicts() {
        let bed = test_bed();
        bed.gateway
            .google_login(Some("google-ann".into()))
            .await
            .unwrap();

        let err = bed
            .gateway
            .google_login(Some("google-ann-other".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::OAuthAccountConflict));
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_concurrent_google_logins_create_one_user() {
        let bed = test_bed();

        let (first, second) = tokio::join!(
            bed.gateway.google_login(Some("google-bob".into())),
            bed.gateway.google_login(Some("google-bob".into())),
        );
        let first = first.unwrap();
        let second = second.unwrap();

        assert_eq!(first.user.user_id, second.user.user_id);
        assert_eq!(bed.users.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_links_with_different_subjects() {
        let bed = test_bed();
        let registered = bed.gateway.register(ann()).await.unwrap();

        let (ann_google, impostor) = tokio::join!(
            bed.gateway.google_login(Some("google-ann".into())),
            bed.gateway.google_login(Some("google-ann-other".into())),
        );
        let outcomes = [ann_google, impostor];

        let conflicts = outcomes
            .iter()
            .filter(|r| matches!(r, Err(AuthError::OAuthAccountConflict)))
            .count();
        assert_eq!(conflicts, 1);
        let winner = outcomes.iter().find_map(|r| r.as_ref().ok()).unwrap();
        assert_eq!(winner.user.user_id, registered.user.user_id);

        let stored = bed
            .users
            .find_by_id(&registered.user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.google_id, winner.user.google_id);
        assert_eq!(bed.users.len().await, 1);
    }

    #[tokio::test]
    async fn test_google_login_after_losing_creation_race_links_winner() {
        let bed = test_bed();
        let registered = bed.gateway.register(ann()).await.unwrap();

        // The first lookup misses the account, so creation hits DuplicateEmail
        let lagging = AuthGateway::new(
            LaggingEmailLookup::new(bed.users.clone(), 1),
            MemoryRevocationStore::new(),
            oauth(),
            config(),
        )
        .unwrap();

        let grant = lagging
            .google_login(Some("google-ann".into()))
            .await
            .unwrap();
        assert_eq!(grant.user.user_id, registered.user.user_id);
        assert_eq!(bed.users.len().await, 1);

        let stored = bed
            .users
            .find_by_id(&registered.user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.google_id.as_ref().map(|g| g.as_str()), Some("g-ann"));
    }

    #[tokio::test]
    async fn test_google_link_rereads_after_concurrent_link() {
        let bed = test_bed();
        let registered = bed.gateway.register(ann()).await.unwrap();
        bed.gateway
            .google_login(Some("google-ann".into()))
            .await
            .unwrap();

        // Lookups still see the account unlinked, so the conditional update is a no-op
        let stale = AuthGateway::new(
            StaleLinkRead {
                inner: bed.users.clone(),
            },
            MemoryRevocationStore::new(),
            oauth(),
            config(),
        )
        .unwrap();

        let same = stale
            .google_login(Some("google-ann".into()))
            .await
            .unwrap();
        assert_eq!(same.user.user_id, registered.user.user_id);
        assert_eq!(same.user.google_id.as_ref().map(|g| g.as_str()), Some("g-ann"));

        assert!(matches!(
            stale.google_login(Some("google-ann-other".into())).await,
            Err(AuthError::OAuthAccountConflict)
        ));

        let stored = bed
            .users
            .find_by_id(&registered.user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.google_id.as_ref().map(|g| g.as_str()), Some("g-ann"));
    }

    #[tokio::test]
    async fn test_google_login_creates_user_without_password_access() {
        let bed = test_bed();
        let grant = bed
            .gateway
            .google_login(Some("google-bob".into()))
            .await
            .unwrap();

        assert_eq!(grant.user.user_role, UserRole::User);
        assert_eq!(grant.user.first_name.as_str(), "Ann Google");
        assert!(grant.user.profile.profile_pic.is_some());

        let err = bed
            .gateway
            .login(login_input("bob@x.com", "password123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_google_login_never_changes_role() {
        let bed = test_bed();
        let hashed = ClearTextPassword::new("password123".to_string())
            .unwrap()
            .hash(None)
            .unwrap();
        let admin = User::register(
            PersonName::new("Ann", "First name").unwrap(),
            Email::new("ann@x.com").unwrap(),
            UserPassword::from(hashed),
            UserRole::Admin,
        );
        bed.users.create(&admin).await.unwrap();

        let grant = bed
            .gateway
            .google_login(Some("google-ann".into()))
            .await
            .unwrap();
        assert_eq!(grant.user.user_role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_google_login_rejections() {
        let bed = test_bed();

        for missing in [None, Some(String::new()), Some("  ".to_string())] {
            let err = bed.gateway.google_login(missing).await.unwrap_err();
            assert_eq!(err.status_code(), 400);
        }

        let err = bed
            .gateway
            .google_login(Some("forged".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOAuthToken(_)));
        assert_eq!(err.status_code(), 500);
        assert_eq!(bed.users.len().await, 0);
    }

    #[tokio::test]
    async fn test_admin_register_requires_admin() {
        let bed = test_bed();
        let plain = bed.gateway.register(ann()).await.unwrap();

        let input = RegisterInput {
            first_name: "Bob".into(),
            email_id: "bob@x.com".into(),
            password: "password123".into(),
        };
        let err = bed
            .gateway
            .admin_register(&plain.user, input, Some("admin"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));

        let mut admin = plain.user.clone();
        admin.user_role = UserRole::Admin;

        let created = bed
            .gateway
            .admin_register(
                &admin,
                RegisterInput {
                    first_name: "Bob".into(),
                    email_id: "bob@x.com".into(),
                    password: "password123".into(),
                },
                Some("Admin"),
            )
            .await
            .unwrap();
        assert_eq!(created.user_role, UserRole::Admin);

        let err = bed
            .gateway
            .admin_register(
                &admin,
                RegisterInput {
                    first_name: "Cy".into(),
                    email_id: "cy@x.com".into(),
                    password: "password123".into(),
                },
                Some("root"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_profile_update_is_partial_and_persisted() {
        let bed = test_bed();
        let grant = bed.gateway.register(ann()).await.unwrap();
        let id = grant.user.user_id;

        bed.gateway
            .update_profile(
                &id,
                ProfileUpdateInput {
                    last_name: Some("Lee".into()),
                    age: Some(31),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let updated = bed
            .gateway
            .update_profile(
                &id,
                ProfileUpdateInput {
                    bio: Some("hello".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name.as_str(), "Ann");
        assert_eq!(updated.last_name.as_ref().map(|n| n.as_str()), Some("Lee"));
        assert_eq!(updated.profile.age.map(|a| a.value()), Some(31));

        let stored = bed.users.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.profile.bio.as_ref().map(|b| b.as_str()), Some("hello"));
    }

    #[tokio::test]
    async fn test_store_outage() {
        let users = MemoryUserRepository::new();
        let gateway = AuthGateway::new(users, DownRevocationStore, oauth(), config()).unwrap();
        let grant = gateway.register(ann()).await.unwrap();
        let token = grant.token.token.as_str();

        assert!(!gateway.session_check(Some(token)).await.authenticated());
        assert!(matches!(
            gateway.authenticate(Some(token)).await,
            Err(AuthError::ServiceUnavailable(_))
        ));
        let err = gateway.logout(token).await.unwrap_err();
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = AuthConfig {
            token_secret: b"short".to_vec(),
            ..config()
        };
        let result = AuthGateway::new(
            MemoryUserRepository::new(),
            MemoryRevocationStore::new(),
            oauth(),
            config,
        );
        assert!(result.is_err());
    }
}

mod router {
    use super::*;
    use crate::presentation::router::auth_router;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        auth_router(test_bed().gateway)
    }

    fn app_with_down_store() -> Router {
        let gateway =
            AuthGateway::new(MemoryUserRepository::new(), DownRevocationStore, oauth(), config())
                .unwrap();
        auth_router(gateway)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    /// `token=...` pair from the Set-Cookie header.
    fn session_cookie(response: &Response) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn ann_body() -> Value {
        json!({ "firstName": "Ann", "emailId": "ann@x.com", "password": "password123" })
    }

    #[tokio::test]
    async fn test_register_login_logout_check() {
        let app = app();

        let response = send(&app, Method::POST, "/register", Some(ann_body()), None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Max-Age=604800"));
        let registered = body_json(response).await;
        assert_eq!(registered["message"], "User Registered Successfully");

        let response = send(
            &app,
            Method::POST,
            "/login",
            Some(json!({ "emailId": "ann@x.com", "password": "password123" })),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response);
        let body = body_json(response).await;
        assert_eq!(body["user"]["emailId"], "ann@x.com");
        assert_eq!(body["user"]["_id"], registered["user"]["_id"]);
        assert_eq!(body["user"]["role"], "user");

        let response = send(&app, Method::GET, "/check", None, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Valid User");

        let response = send(&app, Method::POST, "/logout", None, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::SET_COOKIE]
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );

        let response = send(&app, Method::GET, "/check", None, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["detail"], "Unauthenticated");

        let response = send(&app, Method::GET, "/session", None, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["authenticated"], false);
        assert!(body["user"].is_null());
    }

    #[tokio::test]
    async fn test_session_is_always_ok() {
        let app = app();

        for cookie in [None, Some("token=garbage"), Some("token=")] {
            let response = send(&app, Method::GET, "/session", None, cookie).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await["authenticated"], false);
        }

        let response = send(&app, Method::POST, "/register", Some(ann_body()), None).await;
        let cookie = session_cookie(&response);
        let response = send(&app, Method::GET, "/session", None, Some(&cookie)).await;
        let body = body_json(response).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["user"]["firstName"], "Ann");
    }

    #[tokio::test]
    async fn test_token_failures_share_one_response() {
        let app = app();
        let response = send(&app, Method::POST, "/register", Some(ann_body()), None).await;
        let cookie = session_cookie(&response);
        send(&app, Method::POST, "/logout", None, Some(&cookie)).await;

        let revoked = body_json(send(&app, Method::GET, "/check", None, Some(&cookie)).await).await;
        let garbage =
            body_json(send(&app, Method::GET, "/check", None, Some("token=a.b.c")).await).await;
        let missing = body_json(send(&app, Method::GET, "/check", None, None).await).await;

        assert_eq!(revoked, garbage);
        assert_eq!(revoked, missing);
        assert_eq!(revoked["status"], 401);
    }

    #[tokio::test]
    async fn test_login_errors_identical() {
        let app = app();
        send(&app, Method::POST, "/register", Some(ann_body()), None).await;

        let wrong = send(
            &app,
            Method::POST,
            "/login",
            Some(json!({ "emailId": "ann@x.com", "password": "password999" })),
            None,
        )
        .await;
        let unknown = send(
            &app,
            Method::POST,
            "/login",
            Some(json!({ "emailId": "zed@x.com", "password": "password123" })),
            None,
        )
        .await;

        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(wrong).await, body_json(unknown).await);
    }

    #[tokio::test]
    async fn test_duplicate_and_invalid_registration() {
        let app = app();
        send(&app, Method::POST, "/register", Some(ann_body()), None).await;

        let response = send(&app, Method::POST, "/register", Some(ann_body()), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &app,
            Method::POST,
            "/register",
            Some(json!({ "firstName": "Bo", "emailId": "bo@x.com" })),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_google_login_flow() {
        let app = app();
        let response = send(&app, Method::POST, "/register", Some(ann_body()), None).await;
        let original = body_json(response).await["user"]["_id"].clone();

        for _ in 0..2 {
            let response = send(
                &app,
                Method::POST,
                "/googleLogin",
                Some(json!({ "tokenId": "google-ann" })),
                None,
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().contains_key(header::SET_COOKIE));
            let body = body_json(response).await;
            assert_eq!(body["user"]["_id"], original);
            assert_eq!(body["message"], "Google Login Successful");
        }

        let response = send(&app, Method::POST, "/googleLogin", Some(json!({})), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &app,
            Method::POST,
            "/googleLogin",
            Some(json!({ "tokenId": "forged" })),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["detail"], "Google login failed");
    }

    #[tokio::test]
    async fn test_profile_routes() {
        let app = app();
        let response = send(&app, Method::POST, "/register", Some(ann_body()), None).await;
        let cookie = session_cookie(&response);

        let response = send(
            &app,
            Method::PUT,
            "/update",
            Some(json!({ "lastName": "Lee", "github": "ann-lee" })),
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["lastName"], "Lee");
        assert_eq!(body["user"]["github"], "ann-lee");

        let response = send(&app, Method::GET, "/profile", None, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["firstName"], "Ann");
        assert_eq!(body["user"]["lastName"], "Lee");
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("googleId").is_none());

        let response = send(
            &app,
            Method::PUT,
            "/update",
            Some(json!({ "age": 3 })),
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, Method::GET, "/profile", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_register_forbidden_for_users() {
        let app = app();
        let response = send(&app, Method::POST, "/register", Some(ann_body()), None).await;
        let cookie = session_cookie(&response);

        let response = send(
            &app,
            Method::POST,
            "/admin/register",
            Some(json!({ "firstName": "Bob", "emailId": "bob@x.com", "password": "password123", "role": "admin" })),
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_store_outage_is_503_on_protected_routes() {
        let app = app_with_down_store();
        let response = send(&app, Method::POST, "/register", Some(ann_body()), None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = session_cookie(&response);

        let response = send(&app, Method::GET, "/check", None, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = send(&app, Method::GET, "/session", None, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["authenticated"], false);
    }
}

mod errors {
    use super::*;
    use kernel::error::kind::ErrorKind;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AuthError::Validation("x".into()), 400),
            (AuthError::DuplicateEmail, 400),
            (AuthError::InvalidCredentials, 401),
            (AuthError::InvalidToken, 401),
            (AuthError::ExpiredToken, 401),
            (AuthError::RevokedToken, 401),
            (AuthError::Unauthenticated, 401),
            (AuthError::Forbidden, 403),
            (AuthError::UserNotFound, 404),
            (AuthError::OAuthAccountConflict, 409),
            (AuthError::InvalidOAuthToken("x".into()), 500),
            (AuthError::Internal("x".into()), 500),
            (AuthError::ServiceUnavailable("x".into()), 503),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{err:?}");
        }
    }

    #[test]
    fn test_token_states_collapse() {
        let public: Vec<_> = [
            AuthError::InvalidToken,
            AuthError::ExpiredToken,
            AuthError::RevokedToken,
            AuthError::Unauthenticated,
        ]
        .iter()
        .map(|e| e.to_app_error().message().to_string())
        .collect();
        assert!(public.iter().all(|m| m == "Unauthenticated"));
    }

    #[test]
    fn test_driver_detail_never_leaks() {
        let err = AuthError::from(sqlx::Error::RowNotFound);
        let app_error = err.to_app_error();
        assert_eq!(app_error.kind(), ErrorKind::InternalServerError);
        assert!(!app_error.message().contains("no rows"));

        let err = AuthError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AuthError::ServiceUnavailable(_)));
        assert_eq!(err.to_app_error().message(), "Service temporarily unavailable");
    }

    #[test]
    fn test_provider_detail_never_leaks() {
        let err = AuthError::InvalidOAuthToken("aud=other-client".into());
        assert!(!err.to_app_error().message().contains("other-client"));
    }
}
