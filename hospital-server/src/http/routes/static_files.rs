//! Landing page and favicon

use std::path::Path;

use axum::Router;
use tower_http::services::ServeFile;

/// Serve `index.html` at `/` and `favicon.ico` from `static_dir`.
pub fn router<S>(static_dir: &Path) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/favicon.ico", ServeFile::new(static_dir.join("favicon.ico")))
}
