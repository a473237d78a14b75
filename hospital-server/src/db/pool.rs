//! Connection manager
//!
//! Wraps an injected sqlx `PgPool`. The pool is created lazily so the
//! process starts even when PostgreSQL is down; each request then fails on
//! its own until the database comes back.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use super::value::{bind_params, SqlValue};
use super::{translate_placeholders, DbError};
use crate::config::DatabaseConfig;

/// How long a request waits for a pooled connection before giving up.
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a lazily connected PostgreSQL pool from configuration.
pub fn create_pool(config: &DatabaseConfig) -> PgPool {
    create_pool_with_options(
        config.connect_options(),
        config.max_connections,
        DEFAULT_ACQUIRE_TIMEOUT,
    )
}

/// Create a lazily connected pool with explicit limits.
///
/// # Arguments
///
/// * `options` - PostgreSQL connection options
/// * `max_connections` - Maximum number of connections in the pool
/// * `acquire_timeout` - How long to wait for a connection
pub fn create_pool_with_options(
    options: PgConnectOptions,
    max_connections: u32,
    acquire_timeout: Duration,
) -> PgPool {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_lazy_with(options)
}

/// Most recently generated sequence value for this session.
pub async fn last_inserted_id(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT LASTVAL()")
        .fetch_one(&mut *conn)
        .await
}

/// Shared handle to the relational store
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Liveness probe (`SELECT 1`).
    pub async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Run a read statement and return every row.
    pub async fn fetch_all(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<PgRow>, DbError> {
        let sql = translate_placeholders(statement);
        let rows = bind_params(sqlx::query(sql.as_ref()), params)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Run a read statement that yields at most one row.
    pub async fn fetch_optional(
        &self,
        statement: &str,
        params: &[SqlValue],
    ) -> Result<Option<PgRow>, DbError> {
        let sql = translate_placeholders(statement);
        let row = bind_params(sqlx::query(sql.as_ref()), params)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Run one write statement and commit it. Returns rows affected.
    pub async fn execute(&self, statement: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        let sql = translate_placeholders(statement);
        let mut tx = self.pool.begin().await?;

        match bind_params(sqlx::query(sql.as_ref()), params)
            .execute(&mut *tx)
            .await
        {
            Ok(result) => {
                tx.commit().await?;
                Ok(result.rows_affected())
            }
            Err(e) => {
                rollback(tx).await;
                Err(e.into())
            }
        }
    }

    /// Run one write statement with a `RETURNING` clause and commit it.
    pub async fn write_returning(
        &self,
        statement: &str,
        params: &[SqlValue],
    ) -> Result<Option<PgRow>, DbError> {
        let sql = translate_placeholders(statement);
        let mut tx = self.pool.begin().await?;

        match bind_params(sqlx::query(sql.as_ref()), params)
            .fetch_optional(&mut *tx)
            .await
        {
            Ok(row) => {
                tx.commit().await?;
                Ok(row)
            }
            Err(e) => {
                rollback(tx).await;
                Err(e.into())
            }
        }
    }

    /// Run an INSERT and commit it.
    ///
    /// When `generated_key` is set, the new key is read with
    /// [`last_inserted_id`] on the same session before committing.
    pub async fn insert(
        &self,
        statement: &str,
        params: &[SqlValue],
        generated_key: bool,
    ) -> Result<Option<i64>, DbError> {
        let sql = translate_placeholders(statement);
        let mut tx = self.pool.begin().await?;

        let outcome: Result<Option<i64>, sqlx::Error> = async {
            bind_params(sqlx::query(sql.as_ref()), params)
                .execute(&mut *tx)
                .await?;
            if generated_key {
                last_inserted_id(&mut tx).await.map(Some)
            } else {
                Ok(None)
            }
        }
        .await;

        match outcome {
            Ok(id) => {
                tx.commit().await?;
                Ok(id)
            }
            Err(e) => {
                rollback(tx).await;
                Err(e.into())
            }
        }
    }
}

async fn rollback(tx: Transaction<'static, Postgres>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "rollback failed");
    }
}
