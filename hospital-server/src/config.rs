//! Runtime configuration - environment loading
//!
//! Read once at startup. Variables:
//! - `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_MAX_CONNECTIONS`
//! - `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `CACHE_MODE`, `CACHE_TTL_SECS`
//! - `APP_HOST`, `APP_PORT`, `STATIC_DIR`
//!
//! `APP_DEBUG` belongs to the CLI, which reads it before logging starts.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use sqlx::postgres::PgConnectOptions;

/// Default pool size. Kept low: the workload is low-concurrency CRUD.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default cache time-to-live (5 minutes)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// PostgreSQL connection settings
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Connection options for sqlx.
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user);

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

// Manual impl keeps the password out of logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "hospital".to_string(),
            user: "postgres".to_string(),
            password: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Which cache store backs the read-through cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// External Redis server
    Redis,
    /// In-process store, single node only
    Memory,
    /// No caching at all
    Off,
}

impl FromStr for CacheMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            "off" | "none" | "disabled" => Ok(Self::Off),
            other => Err(format!("unknown cache mode '{}'", other)),
        }
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Redis => "redis",
            Self::Memory => "memory",
            Self::Off => "off",
        };
        f.write_str(name)
    }
}

/// Cache settings
#[derive(Clone)]
pub struct CacheConfig {
    pub mode: CacheMode,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub ttl: Duration,
}

impl CacheConfig {
    /// Redis connection parameters. The password is passed as-is, so
    /// characters reserved in URLs need no escaping.
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                password: self.password.clone(),
                ..Default::default()
            },
        }
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("mode", &self.mode)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: CacheMode::Redis,
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `index.html` and `favicon.ico`
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Create config from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup (for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let database = DatabaseConfig {
            host: get("DB_HOST").unwrap_or(defaults.database.host),
            port: parse_or("DB_PORT", get("DB_PORT"), defaults.database.port)?,
            name: get("DB_NAME").unwrap_or(defaults.database.name),
            user: get("DB_USER").unwrap_or(defaults.database.user),
            password: get("DB_PASSWORD"),
            max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                get("DB_MAX_CONNECTIONS"),
                defaults.database.max_connections,
            )?,
        };

        let ttl_secs = parse_or(
            "CACHE_TTL_SECS",
            get("CACHE_TTL_SECS"),
            DEFAULT_CACHE_TTL_SECS,
        )?;
        let cache = CacheConfig {
            mode: parse_or("CACHE_MODE", get("CACHE_MODE"), defaults.cache.mode)?,
            host: get("REDIS_HOST").unwrap_or(defaults.cache.host),
            port: parse_or("REDIS_PORT", get("REDIS_PORT"), defaults.cache.port)?,
            password: get("REDIS_PASSWORD"),
            ttl: Duration::from_secs(ttl_secs),
        };

        let server = ServerConfig {
            host: get("APP_HOST").unwrap_or(defaults.server.host),
            port: parse_or("APP_PORT", get("APP_PORT"), defaults.server.port)?,
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.server.static_dir),
        };

        Ok(Self {
            database,
            cache,
            server,
        })
    }
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.cache.mode, CacheMode::Redis);
        assert_eq!(config.cache.ttl, Duration::from_secs(300));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn reads_every_section() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_NAME", "ward"),
            ("DB_USER", "clinic"),
            ("DB_PASSWORD", "s3cret"),
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_PORT", "6380"),
            ("CACHE_MODE", "memory"),
            ("CACHE_TTL_SECS", "60"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.password.as_deref(), Some("s3cret"));
        assert_eq!(config.cache.mode, CacheMode::Memory);
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn rejects_bad_port() {
        let err = AppConfig::from_lookup(lookup(&[("APP_PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("DB_PASSWORD", ""), ("DB_PORT", " ")])).unwrap();
        assert!(config.database.password.is_none());
        assert_eq!(config.database.port, 5432);
    }

    #[test]
    fn redis_connection_info_keeps_password_verbatim() {
        let mut cache = CacheConfig::default();
        let info = cache.connection_info();
        assert!(matches!(&info.addr, ConnectionAddr::Tcp(host, 6379) if host == "localhost"));
        assert!(info.redis.password.is_none());

        for password in ["p/ss", "p#ss", "p?ss", "p%41ss", "p@ss:w"] {
            cache.password = Some(password.into());
            let info = redis::Client::open(cache.connection_info())
                .unwrap()
                .get_connection_info()
                .clone();
            assert_eq!(info.redis.password.as_deref(), Some(password));
        }
    }

    #[test]
    fn debug_output_hides_passwords() {
        let db = DatabaseConfig {
            password: Some("hunter2".into()),
            ..Default::default()
        };
        assert!(!format!("{:?}", db).contains("hunter2"));
    }
}
