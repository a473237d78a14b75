//! Axum server setup
//!
//! Server skeleton with:
//! - Permissive CORS (the API is consumed from browsers on other origins)
//! - Tracing and request-metrics middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::path::Path;

use axum::middleware;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::metrics::track_requests;
use super::routes;
use super::state::AppState;
use crate::cache;
use crate::config::AppConfig;
use crate::db::{create_pool, schema, Database};

/// Build the application router with all routes
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::metrics::router())
        .merge(routes::common::router())
        .merge(routes::resources::router())
        .merge(routes::static_files::router(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(middleware::from_fn(track_requests)),
        )
        .with_state(state)
}

/// Run the HTTP server.
///
/// Creates the pool, initializes the schema, connects the cache, then
/// serves until a shutdown signal arrives. An unreachable database or
/// cache does not prevent startup.
///
/// # Example
///
/// ```ignore
/// let config = AppConfig::from_env()?;
/// let metrics = http::metrics::install_recorder()?;
/// run_server(config, metrics).await?;
/// ```
pub async fn run_server(config: AppConfig, metrics: PrometheusHandle) -> Result<(), ServerError> {
    tracing::info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.name,
        max_connections = config.database.max_connections,
        "Configuring database pool"
    );
    let db = Database::new(create_pool(&config.database));
    schema::initialize(&db).await;

    let cache = cache::connect(&config.cache).await;
    let state = AppState::new(db, cache, metrics);
    let app = build_router(state, &config.server.static_dir);

    // Bind listener
    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
