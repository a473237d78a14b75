//! Health check and API liveness endpoints

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::http::metrics::{set_connection_gauge, DATABASE_CONNECTIONS, REDIS_CONNECTIONS};
use crate::http::state::AppState;

pub const SERVICE_NAME: &str = "Hospital Management System API";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
    pub metrics: MetricsInfo,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
    pub cache: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MetricsInfo {
    pub prometheus_endpoint: &'static str,
}

/// GET /health - always 200; dependency state is reported in the body
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (database, database_error) = match state.db().ping().await {
        Ok(()) => ("connected", None),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            ("disconnected", Some(e.to_string()))
        }
    };
    set_connection_gauge(DATABASE_CONNECTIONS, database == "connected");

    let (cache, cache_error) = match state.cache().ping().await {
        None => ("disabled", None),
        Some(Ok(())) => ("connected", None),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Health check: cache unreachable");
            ("disconnected", Some(e.to_string()))
        }
    };
    set_connection_gauge(REDIS_CONNECTIONS, cache == "connected");

    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        timestamp: chrono::Utc::now().to_rfc3339(),
        metrics: MetricsInfo {
            prometheus_endpoint: "/metrics",
        },
        database,
        database_error,
        cache,
        cache_error,
    })
}

/// GET /api/test
async fn api_test() -> Json<Value> {
    Json(json!({
        "message": "API is working",
        "status": "success"
    }))
}

/// Health routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/test", get(api_test))
}
