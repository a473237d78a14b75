//! HTTP server command
//!
//! Loads configuration from the environment, applies flag overrides, and
//! runs the API until Ctrl+C or SIGTERM.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use hospital_server::http::metrics;
use hospital_server::{run_server, AppConfig, CacheMode};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to (default: 0.0.0.0)
    #[arg(long, env = "APP_HOST")]
    pub host: Option<String>,

    /// Port to bind to (default: 5000)
    #[arg(long, short = 'p', env = "APP_PORT")]
    pub port: Option<u16>,

    /// Response cache backend: redis, memory or off
    #[arg(long, env = "CACHE_MODE")]
    pub cache_mode: Option<CacheMode>,

    /// Directory holding index.html and favicon.ico
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

impl ServeArgs {
    fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(mode) = self.cache_mode {
            config.cache.mode = mode;
        }
        if let Some(dir) = self.static_dir {
            config.server.static_dir = dir;
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    args.apply(&mut config);

    tracing::info!(
        "Starting Hospital Management System API on {}:{}",
        config.server.host,
        config.server.port
    );
    tracing::debug!(?config, "Effective configuration");

    let handle = metrics::install_recorder().context("Failed to install metrics recorder")?;

    // Run server (blocks until shutdown)
    run_server(config, handle).await.context("Server error")?;

    Ok(())
}
