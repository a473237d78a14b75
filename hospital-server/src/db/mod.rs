//! Database layer - connection manager and schema
//!
//! # Design Principles
//!
//! - Injected connection pool, owned by `AppState` - no global connection
//! - Statements are written with `?` placeholders and translated on execution
//! - Rely on DB constraints (NOT NULL, FK, PK) - no check-then-insert
//! - Every write runs in its own transaction, rolled back on failure

pub mod error;
pub mod placeholders;
pub mod pool;
pub mod schema;
pub mod value;

pub use error::{DbError, Failure};
pub use placeholders::translate_placeholders;
pub use pool::{create_pool, create_pool_with_options, last_inserted_id, Database};
pub use schema::SchemaReport;
pub use value::{ColumnKind, SqlValue};
