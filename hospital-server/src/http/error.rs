//! API error types with IntoResponse
//!
//! Every error is a JSON body `{"error": <code>, "message": <text>}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::{DbError, Failure};

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Malformed body, bad path key, or nothing to update (400)
    Validation { message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Rejected by a NOT NULL, foreign key or check constraint (400)
    Constraint { message: String },

    /// Duplicate key (409)
    Conflict { message: String },

    /// Database unreachable (503)
    Unavailable,

    /// Unclassified database error (500, logged)
    Database(DbError),

    /// Internal error (500)
    Internal { message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::Constraint { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation { message } => json!({
                "error": "validation_error",
                "message": message
            }),
            Self::NotFound { resource, id } => json!({
                "error": "not_found",
                "message": format!("{} '{}' not found", resource, id)
            }),
            Self::Constraint { message } => json!({
                "error": "constraint_violation",
                "message": message
            }),
            Self::Conflict { message } => json!({
                "error": "conflict",
                "message": message
            }),
            Self::Unavailable => {
                tracing::warn!("Database unavailable");
                json!({
                    "error": "database_unavailable",
                    "message": "the database is currently unavailable"
                })
            }
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                json!({
                    "error": "internal_error",
                    "message": "an internal error occurred"
                })
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                json!({
                    "error": "internal_error",
                    "message": "an internal error occurred"
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::InvalidValue { .. } | DbError::NoFields => Self::Validation {
                message: e.to_string(),
            },
            DbError::Sqlx(_) => match e.failure() {
                Failure::Conflict(message) => Self::Conflict { message },
                Failure::Constraint(message) => Self::Constraint { message },
                Failure::Unavailable => Self::Unavailable,
                Failure::Other => Self::Database(e),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation {
            message: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::from(DbError::NoFields);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "validation_error");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let err = ApiError::from(DbError::NotFound {
            resource: "patient",
            id: "7".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "patient '7' not found");
    }

    #[tokio::test]
    async fn pool_timeout_is_503() {
        let err = ApiError::from(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["error"], "database_unavailable");
    }

    #[tokio::test]
    async fn unclassified_database_error_hides_details() {
        let err = ApiError::from(DbError::Sqlx(sqlx::Error::RowNotFound));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "an internal error occurred");
    }

    #[test]
    fn constraint_and_conflict_statuses() {
        let constraint = ApiError::Constraint {
            message: "violates foreign key constraint".into(),
        };
        let conflict = ApiError::Conflict {
            message: "duplicate key value".into(),
        };
        assert_eq!(constraint.status(), StatusCode::BAD_REQUEST);
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_value_keeps_field_in_message() {
        let err = ApiError::from(DbError::InvalidValue {
            field: "available".into(),
            reason: "expected an integer".into(),
        });
        match err {
            ApiError::Validation { message } => assert!(message.contains("available")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
