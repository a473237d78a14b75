//! Schema commands: create tables, or print the DDL

use anyhow::{bail, Context, Result};

use hospital_server::db::{create_pool, schema, Database};
use hospital_server::AppConfig;

/// Create any missing tables and exit.
pub async fn run_migrate() -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    let db = Database::new(create_pool(&config.database));

    let report = schema::initialize(&db).await;
    if !report.is_complete() {
        let failed: Vec<_> = report.failed.iter().map(|(table, _)| *table).collect();
        bail!("Schema initialization failed for: {}", failed.join(", "));
    }

    println!("{} tables ready", report.created.len());
    Ok(())
}

/// Print the DDL without touching the database.
pub fn run_schema() -> Result<()> {
    print!("{}", schema::ddl_script());
    Ok(())
}
