//! Column values - JSON in, SQL parameters out, and back again

use chrono::NaiveDate;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

use super::DbError;

/// Wire format for DATE columns
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// INTEGER (32-bit)
    Int,
    /// TEXT
    Text,
    /// DATE
    Date,
}

impl ColumnKind {
    /// SQL type name used in DDL
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Int => "INTEGER",
            Self::Text => "TEXT",
            Self::Date => "DATE",
        }
    }
}

/// A typed statement parameter. `None` binds a typed SQL NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(Option<i32>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
}

impl SqlValue {
    /// Convert a JSON field into a parameter for a column of `kind`.
    ///
    /// Type checking is limited to what is needed to bind the value;
    /// NOT NULL and key constraints are left to the database.
    pub fn from_json(kind: ColumnKind, field: &str, value: &Value) -> Result<Self, DbError> {
        let invalid = |reason: &str| DbError::InvalidValue {
            field: field.to_owned(),
            reason: reason.to_owned(),
        };

        match (kind, value) {
            (ColumnKind::Int, Value::Null) => Ok(Self::Int(None)),
            (ColumnKind::Text, Value::Null) => Ok(Self::Text(None)),
            (ColumnKind::Date, Value::Null) => Ok(Self::Date(None)),

            (ColumnKind::Int, Value::Number(n)) => n
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(|n| Self::Int(Some(n)))
                .ok_or_else(|| invalid("expected a 32-bit integer")),
            (ColumnKind::Int, Value::String(s)) => s
                .trim()
                .parse::<i32>()
                .map(|n| Self::Int(Some(n)))
                .map_err(|_| invalid("expected a 32-bit integer")),
            (ColumnKind::Int, _) => Err(invalid("expected a 32-bit integer")),

            (ColumnKind::Text, Value::String(s)) => Ok(Self::Text(Some(s.clone()))),
            (ColumnKind::Text, Value::Number(n)) => Ok(Self::Text(Some(n.to_string()))),
            (ColumnKind::Text, _) => Err(invalid("expected a string")),

            (ColumnKind::Date, Value::String(s)) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map(|d| Self::Date(Some(d)))
                .map_err(|_| invalid("expected a date formatted as YYYY-MM-DD")),
            (ColumnKind::Date, _) => Err(invalid("expected a date formatted as YYYY-MM-DD")),
        }
    }

    /// JSON representation, matching what `decode_column` produces.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(v) => v.map(Value::from).unwrap_or(Value::Null),
            Self::Text(v) => v.clone().map(Value::String).unwrap_or(Value::Null),
            Self::Date(v) => v
                .map(|d| Value::String(d.format(DATE_FORMAT).to_string()))
                .unwrap_or(Value::Null),
        }
    }

    /// Human-readable form for error messages and log fields
    pub fn display(&self) -> String {
        match self.to_json() {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

/// Bind parameters in order.
pub fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[SqlValue],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
            SqlValue::Date(v) => query.bind(*v),
        };
    }
    query
}

/// Read one column of a row as JSON.
pub fn decode_column(row: &PgRow, name: &str, kind: ColumnKind) -> Result<Value, sqlx::Error> {
    let value = match kind {
        ColumnKind::Int => SqlValue::Int(row.try_get::<Option<i32>, _>(name)?),
        ColumnKind::Text => SqlValue::Text(row.try_get::<Option<String>, _>(name)?),
        ColumnKind::Date => SqlValue::Date(row.try_get::<Option<NaiveDate>, _>(name)?),
    };
    Ok(value.to_json())
}
