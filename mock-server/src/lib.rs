//! Generic JSON document server used as the CRUD backend in tests.
//!
//! # Design
//! Collections spring into existence on first use and documents are
//! schemaless JSON objects, so any record type can be exercised against
//! this server without teaching it a schema. The server assigns each
//! created document a UUID string under `"id"` and restamps that field on
//! updates, mirroring the common REST convention the record layer expects.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Documents per collection, keyed by their assigned id.
pub type Db = Arc<RwLock<HashMap<String, HashMap<String, Map<String, Value>>>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/{collection}", get(list_documents).post(create_document))
        .route(
            "/{collection}/{id}",
            get(get_document).put(update_document).delete(delete_document),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Stamp the authoritative id onto a document body. `None` for non-object
/// bodies, which the API rejects.
fn stamped(body: Value, id: &str) -> Option<Map<String, Value>> {
    match body {
        Value::Object(mut document) => {
            document.insert("id".to_string(), Value::String(id.to_string()));
            Some(document)
        }
        _ => None,
    }
}

async fn list_documents(
    State(db): State<Db>,
    Path(collection): Path<String>,
) -> Json<Vec<Value>> {
    let collections = db.read().await;
    let documents = collections
        .get(&collection)
        .map(|documents| documents.values().cloned().map(Value::Object).collect())
        .unwrap_or_default();
    Json(documents)
}

async fn create_document(
    State(db): State<Db>,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let id = Uuid::new_v4().to_string();
    let document = stamped(body, &id).ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    db.write()
        .await
        .entry(collection)
        .or_default()
        .insert(id, document.clone());
    Ok((StatusCode::CREATED, Json(Value::Object(document))))
}

async fn get_document(
    State(db): State<Db>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let collections = db.read().await;
    collections
        .get(&collection)
        .and_then(|documents| documents.get(&id))
        .cloned()
        .map(|document| Json(Value::Object(document)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_document(
    State(db): State<Db>,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let document = stamped(body, &id).ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    let mut collections = db.write().await;
    let documents = collections
        .get_mut(&collection)
        .ok_or(StatusCode::NOT_FOUND)?;
    if !documents.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    documents.insert(id, document.clone());
    Ok(Json(Value::Object(document)))
}

async fn delete_document(
    State(db): State<Db>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    let mut collections = db.write().await;
    collections
        .get_mut(&collection)
        .and_then(|documents| documents.remove(&id))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}
