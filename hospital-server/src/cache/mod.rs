//! Response cache - read-through wrapper for GET paths
//!
//! - Keys are versioned: `hms:v1:{entity}:{operation}:{md5(args)}`
//! - Payloads are strict JSON, decoded with serde_json only
//! - No invalidation on writes: reads may be stale for up to the TTL
//! - A store that cannot be reached is bypassed, never surfaced to clients

pub mod key;
pub mod read_through;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

pub use key::CacheKey;
pub use read_through::ReadThroughCache;
pub use store::{CacheStore, MemoryStore, RedisStore};

use crate::config::{CacheConfig, CacheMode};

/// How long startup waits for Redis before disabling the cache.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Cache error type
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Build the read-through cache described by `config`.
///
/// A Redis server that cannot be reached here disables caching for the
/// life of the process; the API keeps serving uncached reads.
pub async fn connect(config: &CacheConfig) -> ReadThroughCache {
    match config.mode {
        CacheMode::Off => {
            tracing::info!("Response cache disabled by configuration");
            ReadThroughCache::disabled()
        }
        CacheMode::Memory => {
            tracing::info!(ttl_secs = config.ttl.as_secs(), "Using in-process response cache");
            ReadThroughCache::new(Arc::new(MemoryStore::new()), config.ttl)
        }
        CacheMode::Redis => match RedisStore::connect(config.connection_info(), CONNECT_TIMEOUT).await {
            Ok(store) => {
                tracing::info!(
                    host = %config.host,
                    port = config.port,
                    ttl_secs = config.ttl.as_secs(),
                    "Connected to Redis"
                );
                ReadThroughCache::new(Arc::new(store), config.ttl)
            }
            Err(e) => {
                tracing::warn!(
                    host = %config.host,
                    port = config.port,
                    error = %e,
                    "Could not connect to Redis; running without cache"
                );
                ReadThroughCache::disabled()
            }
        },
    }
}
