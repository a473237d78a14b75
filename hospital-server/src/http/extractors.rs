//! Custom Axum extractors

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use super::error::ApiError;
use crate::db::SqlValue;

/// Extract an integer row key from the single path parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowKey(pub i32);

impl RowKey {
    /// Key as a statement parameter list
    pub fn params(self) -> [SqlValue; 1] {
        [SqlValue::Int(Some(self.0))]
    }
}

impl<S> FromRequestParts<S> for RowKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation {
                message: e.body_text(),
            })?;

        let key = raw.trim().parse::<i32>().map_err(|_| ApiError::Validation {
            message: format!("invalid key '{}': expected an integer", raw),
        })?;

        Ok(Self(key))
    }
}
