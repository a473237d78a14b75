//! Read-through wrapper around a cache store

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::{CacheError, CacheKey, CacheStore};

/// Read-through cache for GET results.
///
/// A disabled cache (no store) passes every read straight to the loader.
#[derive(Clone)]
pub struct ReadThroughCache {
    store: Option<Arc<dyn CacheStore>>,
    ttl: Duration,
}

impl ReadThroughCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store: Some(store),
            ttl,
        }
    }

    pub fn disabled() -> Self {
        Self {
            store: None,
            ttl: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Backend name, `None` when disabled
    pub fn backend(&self) -> Option<&'static str> {
        self.store.as_ref().map(|s| s.backend())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Probe the store; `None` when disabled.
    pub async fn ping(&self) -> Option<Result<(), CacheError>> {
        match &self.store {
            Some(store) => Some(store.ping().await),
            None => None,
        }
    }

    /// Return the cached value for `key`, or run `load` and cache its result.
    ///
    /// Hits are returned verbatim. Loader errors are never cached. If the
    /// store fails on lookup the loader runs directly and nothing is written.
    pub async fn get_or_load<E, F, Fut>(&self, key: &CacheKey, load: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        let Some(store) = &self.store else {
            return load().await;
        };

        match store.get(key.as_str()).await {
            Ok(Some(payload)) => match serde_json::from_str::<Value>(&payload) {
                Ok(value) => {
                    tracing::debug!(key = %key, "cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry");
                }
            },
            Ok(None) => {
                tracing::debug!(key = %key, "cache miss");
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache lookup failed; reading through");
                return load().await;
            }
        }

        let value = load().await?;
        self.store_value(store.as_ref(), key, &value).await;
        Ok(value)
    }

    async fn store_value(&self, store: &dyn CacheStore, key: &CacheKey, value: &Value) {
        let payload = value.to_string();
        if let Err(e) = store.set_ex(key.as_str(), &payload, self.ttl).await {
            tracing::warn!(key = %key, error = %e, "cache write failed");
        }
    }
}
