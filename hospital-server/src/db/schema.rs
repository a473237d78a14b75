//! Schema initialization - idempotent table creation
//!
//! Runs once at startup. Each CREATE runs in its own transaction; a failure
//! is logged and rolled back and the remaining tables are still attempted,
//! so a partially initialized database is tolerated.

use super::Database;
use crate::resources::entities;

/// Outcome of one initialization pass
#[derive(Debug, Default)]
pub struct SchemaReport {
    /// Tables whose CREATE succeeded (including ones that already existed)
    pub created: Vec<&'static str>,
    /// Tables whose CREATE failed, with the error
    pub failed: Vec<(&'static str, String)>,
}

impl SchemaReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Full DDL script, in creation order.
pub fn ddl_script() -> String {
    entities::ALL
        .iter()
        .map(|e| format!("{};\n", e.create_table_sql()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Create every table that does not exist yet.
///
/// Never fails: problems are logged and listed in the report. When the
/// database is unreachable the remaining statements are not attempted.
pub async fn initialize(db: &Database) -> SchemaReport {
    tracing::info!("Initializing database schema...");
    let mut report = SchemaReport::default();
    let mut unreachable: Option<String> = None;

    for entity in entities::ALL {
        if let Some(reason) = &unreachable {
            report.failed.push((entity.table, reason.clone()));
            continue;
        }

        match db.execute(&entity.create_table_sql(), &[]).await {
            Ok(_) => {
                tracing::debug!(table = entity.table, "table ready");
                report.created.push(entity.table);
            }
            Err(e) => {
                tracing::error!(table = entity.table, error = %e, "Error creating table");
                if e.is_unavailable() {
                    unreachable = Some(e.to_string());
                }
                report.failed.push((entity.table, e.to_string()));
            }
        }
    }

    if report.is_complete() {
        tracing::info!(tables = report.created.len(), "Database schema initialized");
    } else {
        tracing::warn!(
            ready = report.created.len(),
            failed = report.failed.len(),
            "Database schema partially initialized; continuing"
        );
    }

    report
}
