//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use link_common::{AppConfig, AppError, TokenCodec};
use link_core::traits::{Clock, LinkRepository, SystemClock, UserRepository};
use link_db::{
    create_pool, run_migrations, InMemoryLinkRepository, InMemoryUserRepository,
    PgLinkRepository, PgUserRepository,
};
use link_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router(&state);
    let router = apply_middleware(router, &state);
    router.with_state(state)
}

fn build_state(
    config: AppConfig,
    link_repo: Arc<dyn LinkRepository>,
    user_repo: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
) -> Result<AppState, AppError> {
    let token_codec = Arc::new(TokenCodec::from_config(&config.jwt, clock.clone()));

    let service_context = ServiceContextBuilder::new()
        .link_repo(link_repo)
        .user_repo(user_repo)
        .clock(clock)
        .token_codec(token_codec)
        .links(config.links.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Connect to PostgreSQL, bootstrap the schema and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = link_db::DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("Database schema ready");

    build_state(
        config,
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool)),
        Arc::new(SystemClock),
    )
}

/// AppState backed by in-memory repositories
pub fn create_memory_app_state(config: AppConfig) -> Result<AppState, AppError> {
    build_state(
        config,
        Arc::new(InMemoryLinkRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(SystemClock),
    )
}

/// Run the HTTP server on an already bound listener until ctrl-c
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), AppError> {
    let sweeper = state.rate_limiter().start_sweeper();
    let app = create_app(state);

    if let Ok(addr) = listener.local_addr() {
        info!("Server listening on http://{}", addr);
    }

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::Config(format!("Server error: {}", e)));

    sweeper.stop().await;
    info!("Server stopped");
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

    let state = create_app_state(config).await?;
    serve(listener, state).await
}
