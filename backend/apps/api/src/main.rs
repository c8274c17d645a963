//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are rendered by the
//! auth crate.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::application::SessionService;
use auth::domain::entity::user::NewUser;
use auth::domain::repository::{SessionRepository, UserRepository};
use auth::domain::value_object::{
    permission, user_id::RoleId, user_status::UserStatus, user_type::UserType,
};
use auth::{
    AuthAppState, AuthConfig, MemoryAuthRepository, OidcClient, PgAuthRepository, auth_router,
};
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::password::ClearTextPassword;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ServerConfig, auth_config_from_env};

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

    let server = ServerConfig::from_env()?;
    let auth_config = Arc::new(auth_config_from_env()?);

    let auth = match &server.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            auth_routes(PgAuthRepository::new(pool), auth_config).await?
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            auth_routes(dev_store().await?, auth_config).await?
        }
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = server
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
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
        .merge(auth)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", server.listen_addr);

    let listener = TcpListener::bind(server.listen_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Auth routes over `repo`, after the startup session cleanup
async fn auth_routes<R>(repo: R, config: Arc<AuthConfig>) -> anyhow::Result<Router>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
{
    let repo = Arc::new(repo);

    // Startup cleanup: remove expired sessions
    // Errors here should not prevent server startup
    match SessionService::new(repo.clone(), config.clone())
        .cleanup_expired()
        .await
    {
        Ok(sessions) => {
            tracing::info!(
                sessions_deleted = sessions,
                "Auth session cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Auth session cleanup failed, continuing anyway"
            );
        }
    }

    let provider = if config.oidc.enabled {
        Some(Arc::new(OidcClient::discover(config.oidc.clone()).await?))
    } else {
        None
    };

    Ok(auth_router(AuthAppState::new(repo, provider, config)))
}

/// In-memory store with one admin account
///
/// The admin password comes from `AUTH_DEV_ADMIN_PASSWORD`, or is generated
/// and logged once.
async fn dev_store() -> anyhow::Result<MemoryAuthRepository> {
    let repo = MemoryAuthRepository::new();
    let admin_role = RoleId::new(1);
    repo.insert_role(admin_role, "Super Admin", permission::ALL_GLOBAL, Vec::new());

    let password = match std::env::var("AUTH_DEV_ADMIN_PASSWORD") {
        Ok(password) => password,
        Err(_) => {
            let password = platform::crypto::random_string(16);
            tracing::warn!(password = %password, "Generated development admin password");
            password
        }
    };

    let admin = NewUser {
        username: "admin".to_string(),
        name: "Admin".to_string(),
        email: "admin@localhost.localdomain".to_string(),
        user_type: UserType::User,
        password_login: true,
        password: Some(ClearTextPassword::new(password.as_str())),
        role_id: admin_role,
        status: UserStatus::Enabled,
    };
    repo.create_user(&admin).await?;

    Ok(repo)
}
