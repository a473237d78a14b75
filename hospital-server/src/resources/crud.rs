//! Generic CRUD repository
//!
//! One implementation serves every table; behaviour is driven entirely by
//! the entity descriptor. Each operation is a single statement.

use serde_json::{Map, Value};
use sqlx::postgres::PgRow;

use super::descriptor::EntityDescriptor;
use super::entities;
use crate::db::value::decode_column;
use crate::db::{Database, DbError, SqlValue};

/// JSON object keyed by column name
pub type Record = Map<String, Value>;

/// Repository over one table
pub struct CrudRepo<'a> {
    db: &'a Database,
    entity: &'static EntityDescriptor,
}

impl<'a> CrudRepo<'a> {
    pub fn new(db: &'a Database, entity: &'static EntityDescriptor) -> Self {
        Self { db, entity }
    }

    /// Every row, ordered by key.
    pub async fn list(&self) -> Result<Vec<Value>, DbError> {
        let rows = self.db.fetch_all(&self.entity.select_all_sql(), &[]).await?;
        rows.iter()
            .map(|row| self.to_json(row).map(Value::Object))
            .collect()
    }

    /// One row by key.
    pub async fn get(&self, key: &[SqlValue]) -> Result<Record, DbError> {
        let row = self
            .db
            .fetch_optional(&self.entity.select_one_sql(), key)
            .await?
            .ok_or_else(|| self.not_found(key))?;
        self.to_json(&row)
    }

    /// Insert one row from a request body.
    ///
    /// Only columns present in the body are written; the database applies
    /// defaults and rejects missing NOT NULL columns. Returns the key of
    /// the new row.
    pub async fn create(&self, body: &Record) -> Result<Record, DbError> {
        let fields = self.collect_fields(body, |name| {
            !(self.entity.generated_key && self.entity.is_key(name))
        })?;
        let columns: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        let params: Vec<SqlValue> = fields.iter().map(|(_, v)| v.clone()).collect();

        let generated = self
            .db
            .insert(&self.entity.insert_sql(&columns), &params, self.entity.generated_key)
            .await?;

        let mut key = Record::new();
        match generated {
            Some(id) => {
                key.insert(self.entity.key[0].to_string(), Value::from(id));
            }
            None => {
                for (name, value) in &fields {
                    if self.entity.is_key(name) {
                        key.insert(name.to_string(), value.to_json());
                    }
                }
            }
        }

        let key_json = Value::Object(key.clone());
        tracing::info!(entity = self.entity.name, key = %key_json, "row created");
        Ok(key)
    }

    /// Update the non-key columns present in the body. Absent columns are
    /// left unchanged. Returns the full updated row.
    pub async fn update(&self, key: &[SqlValue], body: &Record) -> Result<Record, DbError> {
        let fields = self.collect_fields(body, |name| !self.entity.is_key(name))?;
        if fields.is_empty() {
            return Err(DbError::NoFields);
        }

        let columns: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        let params: Vec<SqlValue> = fields
            .into_iter()
            .map(|(_, v)| v)
            .chain(key.iter().cloned())
            .collect();

        let row = self
            .db
            .write_returning(&self.entity.update_sql(&columns), &params)
            .await?
            .ok_or_else(|| self.not_found(key))?;
        self.to_json(&row)
    }

    /// Delete one row by key.
    pub async fn delete(&self, key: &[SqlValue]) -> Result<(), DbError> {
        let affected = self.db.execute(&self.entity.delete_sql(), key).await?;
        if affected == 0 {
            return Err(self.not_found(key));
        }
        tracing::info!(entity = self.entity.name, key = %display_key(key), "row deleted");
        Ok(())
    }

    /// Convert body fields that name known columns. Unknown fields are
    /// ignored; `include` filters which columns may be written.
    fn collect_fields<F>(&self, body: &Record, include: F) -> Result<Vec<(&'static str, SqlValue)>, DbError>
    where
        F: Fn(&str) -> bool,
    {
        self.entity
            .columns
            .iter()
            .filter(|c| include(c.name))
            .filter_map(|c| body.get(c.name).map(|v| (c, v)))
            .map(|(c, v)| SqlValue::from_json(c.kind, c.name, v).map(|value| (c.name, value)))
            .collect()
    }

    fn to_json(&self, row: &PgRow) -> Result<Record, DbError> {
        let mut record = Record::new();
        for column in self.entity.columns {
            record.insert(column.name.to_string(), decode_column(row, column.name, column.kind)?);
        }
        Ok(record)
    }

    fn not_found(&self, key: &[SqlValue]) -> DbError {
        DbError::NotFound {
            resource: self.entity.name,
            id: display_key(key),
        }
    }
}

fn display_key(key: &[SqlValue]) -> String {
    key.iter()
        .map(SqlValue::display)
        .collect::<Vec<_>>()
        .join("/")
}

/// Row counts for every table, as `{"patient": n, ...}`.
pub async fn table_counts(db: &Database) -> Result<Record, DbError> {
    let statement = counts_sql();
    let row = db
        .fetch_optional(&statement, &[])
        .await?
        .ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))?;

    let mut counts = Record::new();
    for entity in entities::ALL {
        let count: i64 = sqlx::Row::try_get(&row, entity.name)?;
        counts.insert(entity.name.to_string(), Value::from(count));
    }
    Ok(counts)
}

fn counts_sql() -> String {
    let columns = entities::ALL
        .iter()
        .map(|e| format!("(SELECT COUNT(*) FROM {}) AS {}", e.table, e.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {}", columns)
}
