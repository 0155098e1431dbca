//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::application::AuthGateway;
use crate::domain::repository::{RevocationStore, UserRepository};
use crate::domain::services::OAuthVerifier;
use crate::presentation::handlers;
use crate::presentation::middleware::require_session;

/// Create the Auth router for any store / verifier implementation
pub fn auth_router<U, R, O>(gateway: AuthGateway<U, R, O>) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    R: RevocationStore + Send + Sync + 'static,
    O: OAuthVerifier + Send + Sync + 'static,
{
    let protected = Router::new()
        .route("/logout", post(handlers::logout::<U, R, O>))
        .route("/check", get(handlers::check))
        .route("/profile", get(handlers::profile))
        .route("/update", put(handlers::update_profile::<U, R, O>))
        .route("/admin/register", post(handlers::admin_register::<U, R, O>))
        .route_layer(middleware::from_fn_with_state(
            gateway.clone(),
            require_session::<U, R, O>,
        ));

    Router::new()
        .route("/register", post(handlers::register::<U, R, O>))
        .route("/login", post(handlers::login::<U, R, O>))
        .route("/googleLogin", post(handlers::google_login::<U, R, O>))
        .route("/session", get(handlers::session_status::<U, R, O>))
        .merge(protected)
        .with_state(gateway)
}
