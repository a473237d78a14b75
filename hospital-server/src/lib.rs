//! hospital-server: HTTP API over the hospital records database
//!
//! Patients, doctors, nurses, appointments, rooms, medications, departments
//! and procedures, plus the `undergoes` and `prescribes` associations.
//! Every table is served by one generic CRUD component driven by static
//! descriptors; GET results go through a read-through cache.

pub mod cache;
pub mod config;
pub mod db;
pub mod http;
pub mod resources;

pub use config::{AppConfig, CacheMode, ConfigError};
pub use db::{Database, DbError};
pub use http::{build_router, run_server, ApiError, AppState, ServerError};
