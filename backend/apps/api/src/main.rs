//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors render through `auth::AuthError`.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use auth::application::config::SameSite;
use auth::{
    AuthConfig, AuthGateway, GoogleOAuthVerifier, PgRevocationStore, PgUserRepository,
    auth_router,
};
use axum::{
    Router, http,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 31113;
const REVOCATION_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_auth_config()?;
    tracing::info!(?config, "Auth configuration loaded");

    // Credential store
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(config.dependency_timeout)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Both migration sets share `_sqlx_migrations` when the stores share a database
    let mut migrator = sqlx::migrate!("../../../database/migrations");
    migrator.set_ignore_missing(true);
    migrator.run(&pool).await?;

    tracing::info!("Migrations completed");

    // Revocation store: separate connection string, same database by default
    let revocation_url = env::var("REVOCATION_STORE_URL").unwrap_or_else(|_| database_url.clone());
    let revocations = PgRevocationStore::connect(&revocation_url, 5, config.dependency_timeout)?;

    let mut revocation_migrator = sqlx::migrate!("../../../database/revocation");
    revocation_migrator.set_ignore_missing(true);
    revocation_migrator.run(revocations.pool()).await?;

    // Startup cleanup: errors here should not prevent server startup
    if let Err(e) = revocations.purge_expired().await {
        tracing::warn!(error = %e, "Revocation purge failed, continuing anyway");
    }
    let purge_task = tokio::spawn(purge_periodically(revocations.clone()));

    let oauth = GoogleOAuthVerifier::new(config.dependency_timeout)?;
    let gateway = AuthGateway::new(
        PgUserRepository::new(pool.clone()),
        revocations.clone(),
        oauth,
        config,
    )?;

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/user", auth_router(gateway))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = match env::var("PORT") {
        Ok(raw) => raw.parse().context("PORT must be a port number")?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    purge_task.abort();
    revocations.close().await;
    pool.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let base = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig::default()
    };

    let token_secret = match env::var("JWT_KEY") {
        Ok(key) => key.into_bytes(),
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("JWT_KEY not set, using a random per-process secret");
            base.token_secret.clone()
        }
        Err(_) => anyhow::bail!("JWT_KEY must be set in production"),
    };

    let cookie_secure = match env::var("APP_ENV") {
        Ok(app_env) => app_env.eq_ignore_ascii_case("production"),
        Err(_) => base.cookie_secure,
    };

    let cookie_same_site = match env::var("COOKIE_SAME_SITE") {
        Ok(raw) => raw.parse::<SameSite>().map_err(anyhow::Error::msg)?,
        Err(_) => base.cookie_same_site,
    };

    Ok(AuthConfig {
        token_secret,
        cookie_secure,
        cookie_same_site,
        password_pepper: env::var("PASSWORD_PEPPER").ok().map(String::into_bytes),
        oauth_client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
        ..base
    })
}

async fn purge_periodically(store: PgRevocationStore) {
    let mut ticker = tokio::time::interval(REVOCATION_PURGE_INTERVAL);
    // The first tick completes immediately; startup already purged
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if let Err(e) = store.purge_expired().await {
            tracing::warn!(error = %e, "Periodic revocation purge failed");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
