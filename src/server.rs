//! HTTP server initialization and runtime setup.
//!
//! Selects the storage backend, builds the router and runs axum until a
//! shutdown signal arrives.

use crate::application::services::AuthService;
use crate::config::Config;
use crate::domain::repositories::{BlobStore, ContentRepository};
use crate::infrastructure::persistence::{MemoryContentStore, PgBlobStore, PgContentRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Connects the PostgreSQL pool with the configured limits.
///
/// # Errors
///
/// Returns an error if no connection can be established.
pub async fn connect_pool(config: &Config, database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Builds shared state on PostgreSQL, or on the in-memory store when no
/// database is configured.
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail, or the
/// admin token hash is not hex.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let auth_service = Arc::new(
        AuthService::new(
            config.token_signing_secret.clone(),
            &config.admin_token_hash,
        )
        .context("ADMIN_TOKEN_HASH is not valid hex")?,
    );

    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("No database configured; content is kept in memory and lost on restart");
        let store = Arc::new(MemoryContentStore::new());
        let repository: Arc<dyn ContentRepository> = store.clone();
        let blobs: Arc<dyn BlobStore> = store;
        return Ok(AppState::new(repository, blobs, auth_service, "memory"));
    };

    let pool = connect_pool(config, database_url).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");

    let pool = Arc::new(pool);
    let repository: Arc<dyn ContentRepository> =
        Arc::new(PgContentRepository::new(pool.clone()));
    let blobs: Arc<dyn BlobStore> = Arc::new(PgBlobStore::new(pool));

    Ok(AppState::new(repository, blobs, auth_service, "postgres"))
}

/// Runs the HTTP server with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Storage initialisation fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;

    let app = app_router(state, config.max_upload_bytes);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
