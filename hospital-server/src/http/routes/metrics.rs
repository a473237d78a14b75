//! Prometheus exposition endpoint

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::{routing::get, Router};

use crate::http::state::AppState;

const CONTENT_TYPE_TEXT: &str = "text/plain; version=0.0.4";

/// GET /metrics
async fn render(State(state): State<AppState>) -> impl IntoResponse {
    ([(CONTENT_TYPE, CONTENT_TYPE_TEXT)], state.metrics().render())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(render))
}
