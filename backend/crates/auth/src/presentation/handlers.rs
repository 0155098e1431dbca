//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::IntoResponse;

use platform::cookie::{delete_cookie_header, extract_cookie, set_cookie_header};

use crate::application::config::AuthConfig;
use crate::application::{AuthGateway, SessionGrant};
use crate::domain::entity::session::AuthenticatedSession;
use crate::domain::repository::{RevocationStore, UserRepository};
use crate::domain::services::OAuthVerifier;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AdminRegisterRequest, AuthResponse, GoogleLoginRequest, LoginRequest, MessageResponse,
    ProfileResponse, ProfileUpdateRequest, ProfileUpdateResponse, ProfileView, RegisterRequest,
    SessionResponse, UserView,
};

// ============================================================================
// Register
// ============================================================================

/// POST /register
pub async fn register<U, R, O>(
    State(gateway): State<AuthGateway<U, R, O>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    R: RevocationStore + Send + Sync + 'static,
    O: OAuthVerifier + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(rejection)?;
    let grant = gateway.register(req.into()).await?;

    signed_in(
        gateway.config(),
        StatusCode::CREATED,
        grant,
        "User Registered Successfully",
    )
}

// ============================================================================
// Login
// ============================================================================

/// POST /login
pub async fn login<U, R, O>(
    State(gateway): State<AuthGateway<U, R, O>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    R: RevocationStore + Send + Sync + 'static,
    O: OAuthVerifier + Send + Sync + 'static,
{
    // An unreadable body is just another bad credential
    let Json(req) = payload.map_err(|_| AuthError::InvalidCredentials)?;
    let grant = gateway.login(req.into()).await?;

    signed_in(gateway.config(), StatusCode::OK, grant, "Logged In Successfully")
}

// ============================================================================
// Logout
// ============================================================================

/// POST /logout (session required)
pub async fn logout<U, R, O>(
    State(gateway): State<AuthGateway<U, R, O>>,
    Extension(session): Extension<AuthenticatedSession>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    R: RevocationStore + Send + Sync + 'static,
    O: OAuthVerifier + Send + Sync + 'static,
{
    gateway.logout(&session.token).await?;

    let cookie = delete_cookie_header(&gateway.config().cookie_config())
        .ok_or_else(|| AuthError::Internal("unencodable cookie".to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Logged Out Successfully".to_string(),
        }),
    ))
}

// ============================================================================
// Google Login
// ============================================================================

/// POST /googleLogin
pub async fn google_login<U, R, O>(
    State(gateway): State<AuthGateway<U, R, O>>,
    payload: Result<Json<GoogleLoginRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    R: RevocationStore + Send + Sync + 'static,
    O: OAuthVerifier + Send + Sync + 'static,
{
    let token_id = payload.ok().and_then(|Json(req)| req.token_id);
    let grant = gateway.google_login(token_id).await?;

    signed_in(gateway.config(), StatusCode::OK, grant, "Google Login Successful")
}

// ============================================================================
// Session
// ============================================================================

/// GET /check (session required)
pub async fn check(Extension(session): Extension<AuthenticatedSession>) -> Json<AuthResponse> {
    Json(AuthResponse {
        user: UserView::from(&session.user),
        message: "Valid User".to_string(),
    })
}

/// GET /session, always 200
pub async fn session_status<U, R, O>(
    State(gateway): State<AuthGateway<U, R, O>>,
    headers: HeaderMap,
) -> Json<SessionResponse>
where
    U: UserRepository + Send + Sync + 'static,
    R: RevocationStore + Send + Sync + 'static,
    O: OAuthVerifier + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &gateway.config().cookie_name);
    let status = gateway.session_check(token.as_deref()).await;

    Json(SessionResponse {
        authenticated: status.authenticated(),
        user: status.user.as_ref().map(UserView::from),
    })
}

// ============================================================================
// Profile
// ============================================================================

/// GET /profile (session required)
pub async fn profile(Extension(session): Extension<AuthenticatedSession>) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        user: ProfileView::from(&session.user),
    })
}

/// PUT /update (session required)
pub async fn update_profile<U, R, O>(
    State(gateway): State<AuthGateway<U, R, O>>,
    Extension(session): Extension<AuthenticatedSession>,
    payload: Result<Json<ProfileUpdateRequest>, JsonRejection>,
) -> AuthResult<Json<ProfileUpdateResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    R: RevocationStore + Send + Sync + 'static,
    O: OAuthVerifier + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(rejection)?;
    let user = gateway
        .update_profile(&session.user.user_id, req.into())
        .await?;

    Ok(Json(ProfileUpdateResponse {
        message: "Profile Updated Successfully".to_string(),
        user: ProfileView::from(&user),
    }))
}

// ============================================================================
// Admin
// ============================================================================

/// POST /admin/register (admin session required)
pub async fn admin_register<U, R, O>(
    State(gateway): State<AuthGateway<U, R, O>>,
    Extension(session): Extension<AuthenticatedSession>,
    payload: Result<Json<AdminRegisterRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    R: RevocationStore + Send + Sync + 'static,
    O: OAuthVerifier + Send + Sync + 'static,
{
    if !session.user.user_role.is_admin() {
        return Err(AuthError::Forbidden);
    }

    let Json(req) = payload.map_err(rejection)?;
    let role = req.role;
    let input = RegisterRequest {
        first_name: req.first_name,
        email_id: req.email_id,
        password: req.password,
    };

    let user = gateway
        .admin_register(&session.user, input.into(), role.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserView::from(&user),
            message: "User Registered Successfully".to_string(),
        }),
    ))
}

// ============================================================================
// Helpers
// ============================================================================

fn rejection(err: JsonRejection) -> AuthError {
    AuthError::Validation(err.body_text())
}

fn signed_in(
    config: &AuthConfig,
    status: StatusCode,
    grant: SessionGrant,
    message: &str,
) -> AuthResult<(StatusCode, [(header::HeaderName, HeaderValue); 1], Json<AuthResponse>)> {
    let cookie = set_cookie_header(&config.cookie_config(), &grant.token.token)
        .ok_or_else(|| AuthError::Internal("unencodable cookie".to_string()))?;

    Ok((
        status,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: UserView::from(&grant.user),
            message: message.to_string(),
        }),
    ))
}
