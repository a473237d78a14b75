//! Database error types

use sqlx::error::ErrorKind;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("request body contains no updatable fields")]
    NoFields,
}

/// How a failed statement should be reported to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Duplicate primary key
    Conflict(String),
    /// NOT NULL, foreign key, check violations and malformed values
    Constraint(String),
    /// Database could not be reached
    Unavailable,
    /// Anything else
    Other,
}

impl DbError {
    /// Classify the underlying driver error.
    pub fn failure(&self) -> Failure {
        match self {
            Self::Sqlx(err) => classify(err),
            _ => Failure::Other,
        }
    }

    /// True when the database itself is unreachable.
    pub fn is_unavailable(&self) -> bool {
        self.failure() == Failure::Unavailable
    }
}

fn classify(err: &sqlx::Error) -> Failure {
    match err {
        sqlx::Error::Database(db) => {
            let message = db.message().to_string();
            match db.kind() {
                ErrorKind::UniqueViolation => Failure::Conflict(message),
                ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => Failure::Constraint(message),
                // SQLSTATE class 22: data exception (out of range, bad format)
                _ if db.code().is_some_and(|code| code.starts_with("22")) => {
                    Failure::Constraint(message)
                }
                _ => Failure::Other,
            }
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => Failure::Unavailable,
        _ => Failure::Other,
    }
}
