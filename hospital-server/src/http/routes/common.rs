//! Dashboard summary endpoint

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::cache::CacheKey;
use crate::db::DbError;
use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::resources::table_counts;

/// GET /common - row count per table
async fn counts(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let key = CacheKey::new("common", "counts", &json!({}));
    let counts = state
        .cache()
        .get_or_load(&key, || async {
            let counts = table_counts(state.db()).await?;
            Ok::<_, DbError>(Value::Object(counts))
        })
        .await?;
    Ok(Json(counts))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/common", get(counts))
}
