//! Table endpoints
//!
//! One set of handlers serves every entity; each route captures the
//! entity's descriptor. GETs go through the read-through cache.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::cache::CacheKey;
use crate::db::DbError;
use crate::http::error::ApiError;
use crate::http::extractors::RowKey;
use crate::http::state::AppState;
use crate::resources::entities;
use crate::resources::{CrudRepo, EntityDescriptor, Record};

type JsonBody = Result<Json<Record>, JsonRejection>;

/// GET /{entity} - every row, ordered by key
async fn list_rows(
    state: AppState,
    entity: &'static EntityDescriptor,
) -> Result<Json<Value>, ApiError> {
    let key = CacheKey::new(entity.name, "list", &json!({}));
    let rows = state
        .cache()
        .get_or_load(&key, || async {
            let rows = CrudRepo::new(state.db(), entity).list().await?;
            Ok::<_, DbError>(Value::Array(rows))
        })
        .await?;
    Ok(Json(rows))
}

/// POST /{entity} - insert one row, respond with its key
async fn create_row(
    state: AppState,
    entity: &'static EntityDescriptor,
    payload: JsonBody,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let Json(body) = payload?;
    let key = CrudRepo::new(state.db(), entity).create(&body).await?;
    Ok((StatusCode::CREATED, Json(key)))
}

/// GET /{entity}/{key}
async fn get_row(
    state: AppState,
    entity: &'static EntityDescriptor,
    key: RowKey,
) -> Result<Json<Value>, ApiError> {
    let cache_key = CacheKey::new(entity.name, "get", &key_args(entity, key));
    let row = state
        .cache()
        .get_or_load(&cache_key, || async {
            let row = CrudRepo::new(state.db(), entity).get(&key.params()).await?;
            Ok::<_, DbError>(Value::Object(row))
        })
        .await?;
    Ok(Json(row))
}

/// PUT /{entity}/{key} - partial update
async fn update_row(
    state: AppState,
    entity: &'static EntityDescriptor,
    key: RowKey,
    payload: JsonBody,
) -> Result<Json<Record>, ApiError> {
    let Json(body) = payload?;
    let row = CrudRepo::new(state.db(), entity)
        .update(&key.params(), &body)
        .await?;
    tracing::info!(entity = entity.name, key = key.0, "row updated");
    Ok(Json(row))
}

/// DELETE /{entity}/{key}
async fn delete_row(
    state: AppState,
    entity: &'static EntityDescriptor,
    key: RowKey,
) -> Result<StatusCode, ApiError> {
    CrudRepo::new(state.db(), entity).delete(&key.params()).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn key_args(entity: &EntityDescriptor, key: RowKey) -> Value {
    let mut args = Record::new();
    args.insert(entity.key[0].to_string(), Value::from(key.0));
    Value::Object(args)
}

/// Routes for one entity
pub fn entity_router(entity: &'static EntityDescriptor) -> Router<AppState> {
    let collection = get(move |State(state): State<AppState>| list_rows(state, entity)).post(
        move |State(state): State<AppState>, payload: JsonBody| create_row(state, entity, payload),
    );
    let router = Router::new().route(&format!("/{}", entity.name), collection);

    if !entity.item_routes {
        return router;
    }

    let item = get(move |State(state): State<AppState>, key: RowKey| get_row(state, entity, key))
        .put(
            move |State(state): State<AppState>, key: RowKey, payload: JsonBody| {
                update_row(state, entity, key, payload)
            },
        )
        .delete(move |State(state): State<AppState>, key: RowKey| {
            delete_row(state, entity, key)
        });
    router.route(&format!("/{}/{{{}}}", entity.name, entity.path_param), item)
}

/// Routes for every entity
pub fn router() -> Router<AppState> {
    entities::ALL
        .iter()
        .copied()
        .fold(Router::new(), |router, entity| router.merge(entity_router(entity)))
}
