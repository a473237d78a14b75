//! HTTP server layer
//!
//! Axum server with:
//! - Permissive CORS
//! - Request tracing and Prometheus request metrics
//! - Graceful shutdown
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{build_router, run_server, ServerError};
pub use state::AppState;
