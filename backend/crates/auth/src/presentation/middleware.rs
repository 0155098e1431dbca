//! Auth Middleware
//!
//! Guards protected routes with the session cookie.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::application::AuthGateway;
use crate::domain::repository::{RevocationStore, UserRepository};
use crate::domain::services::OAuthVerifier;
use crate::error::AuthError;

/// Rejects with 401 on a missing, invalid, expired or revoked token and with 503
/// when revocation state cannot be read. On success the
/// [`AuthenticatedSession`](crate::domain::AuthenticatedSession) is placed in the
/// request extensions.
pub async fn require_session<U, R, O>(
    State(gateway): State<AuthGateway<U, R, O>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    U: UserRepository + Send + Sync + 'static,
    R: RevocationStore + Send + Sync + 'static,
    O: OAuthVerifier + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(req.headers(), &gateway.config().cookie_name);
    let session = gateway.authenticate(token.as_deref()).await?;

    tracing::debug!(user_id = %session.user.user_id, "Session accepted");

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
