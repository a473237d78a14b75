//! Application state shared across handlers

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::cache::ReadThroughCache;
use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: Database,
    cache: ReadThroughCache,
    metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(db: Database, cache: ReadThroughCache, metrics: PrometheusHandle) -> Self {
        Self {
            inner: Arc::new(AppStateInner { db, cache, metrics }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn cache(&self) -> &ReadThroughCache {
        &self.inner.cache
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.inner.metrics
    }
}
