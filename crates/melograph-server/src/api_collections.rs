//! Collection resource handlers.
//!
//! `GET /api/collections` returns every stored collection; `POST` creates
//! one from url-encoded form fields. Both are thin proxies over a single
//! SQL statement run through the database gateway.

use crate::api::ApiError;
use crate::AppState;
use axum::{
    extract::{Extension, Form},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use melograph_db::Gateway;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One row of the `collections` table, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRow {
    pub collection_id: i64,
    pub collection_name: String,
    pub owner_id: String,
    pub created_at: String,
    pub collection_description: String,
}

/// Form body for `POST /api/collections`.
///
/// All three fields are required; the identifier and creation timestamp are
/// assigned by the store.
#[derive(Debug, Deserialize)]
pub struct CreateCollectionForm {
    pub collection_name: String,
    pub owner_id: String,
    pub collection_description: String,
}

/// Response body for `GET /api/collections`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CollectionListResponse {
    pub result: Vec<CollectionRow>,
}

/// Response body for a successful `POST /api/collections`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCollectionResponse {
    pub result: i64,
}

const SELECT_COLLECTIONS: &str = "SELECT collection_id, collection_name, owner_id, created_at, \
     collection_description FROM collections";

const INSERT_COLLECTION: &str = "INSERT INTO collections \
     (collection_name, owner_id, created_at, collection_description) \
     VALUES (?1, ?2, datetime('now'), ?3) RETURNING collection_id";

fn map_row_to_collection(row: &Row<'_>) -> rusqlite::Result<CollectionRow> {
    Ok(CollectionRow {
        collection_id: row.get(0)?,
        collection_name: row.get(1)?,
        owner_id: row.get(2)?,
        created_at: row.get(3)?,
        collection_description: row.get(4)?,
    })
}

/// Handler for `GET /api/collections`.
///
/// Returns every collection in insertion order, wrapped as
/// `{"result": [...]}`.
pub async fn list_collections_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<CollectionListResponse>, ApiError> {
    let rows = tokio::task::spawn_blocking(move || {
        let gateway = Gateway::acquire(&state.pool)
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {}", e)))?;
        gateway
            .select(SELECT_COLLECTIONS, [], map_row_to_collection)
            .map_err(|e| ApiError::InternalServerError(format!("collection query failed: {}", e)))
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {}", e)))??;

    tracing::debug!(count = rows.len(), "listed collections");

    Ok(Json(CollectionListResponse { result: rows }))
}

/// Handler for `POST /api/collections`.
///
/// Inserts one collection and answers `{"result": <id>}` with the
/// store-assigned identifier. When the store yields no identifier (a
/// constraint rejected the row), the answer is a 500 whose body still
/// carries a `result` field, so a client reading only `result` sees the
/// failure marker instead of an id.
pub async fn create_collection_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<CreateCollectionForm>,
) -> Result<Response, ApiError> {
    let inserted = tokio::task::spawn_blocking(move || {
        let gateway = Gateway::acquire(&state.pool)
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {}", e)))?;
        gateway
            .insert_returning_id(
                INSERT_COLLECTION,
                params![
                    form.collection_name,
                    form.owner_id,
                    form.collection_description
                ],
            )
            .map_err(|e| ApiError::InternalServerError(format!("collection insert failed: {}", e)))
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {}", e)))??;

    match inserted {
        Some(id) => {
            tracing::debug!(collection_id = id, "created collection");
            Ok(Json(CreateCollectionResponse { result: id }).into_response())
        }
        None => {
            tracing::warn!("collection insert yielded no identifier");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "result": "query unsuccessful" })),
            )
                .into_response())
        }
    }
}
