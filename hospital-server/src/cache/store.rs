//! Cache stores - Redis and in-process

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, IntoConnectionInfo};
use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};

use super::CacheError;

/// Upper bound on a single cache round trip.
const OPERATION_TIMEOUT: Duration = Duration::from_secs(1);

/// Key-value store with expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value, `None` on miss or expiry.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value that expires after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Liveness probe.
    async fn ping(&self) -> Result<(), CacheError>;

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;
}

/// Redis-backed store. The connection manager reconnects on its own;
/// each call is bounded by a timeout so a stalled server cannot hold up a
/// request.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisStore {
    /// Connect and verify with PING.
    pub async fn connect(
        info: impl IntoConnectionInfo,
        connect_timeout: Duration,
    ) -> Result<Self, CacheError> {
        let client = redis::Client::open(info)?;
        let conn = timeout(connect_timeout, client.get_connection_manager())
            .await
            .map_err(|_| CacheError::Timeout(connect_timeout))??;

        let store = Self {
            conn,
            op_timeout: OPERATION_TIMEOUT,
        };
        store.ping().await?;
        Ok(store)
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value = timeout(self.op_timeout, conn.get::<_, Option<String>>(key))
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout))??;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        timeout(self.op_timeout, conn.set_ex::<_, _, ()>(key, value, seconds))
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout))??;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _pong: String = timeout(self.op_timeout, redis::cmd("PING").query_async(&mut conn))
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout))??;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// In-process store for single-node deployments and tests.
///
/// Uses tokio's clock, so expiry follows `tokio::time::pause`/`advance`.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        // Keys that are never read again would otherwise stay forever
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_owned(), (value.to_owned(), now + ttl));
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
