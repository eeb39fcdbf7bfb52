//! Trainer and training-topic endpoints.
//!
//! Both resources share one handler set; each mounted router carries its own
//! `CatalogService` as state.

use crate::app::error::{ApiError, ApiResultExt};
use crate::app::AppState;
use crate::core::catalog::{CatalogKind, CatalogService};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

pub fn router(service: CatalogService) -> Router<AppState> {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route(
            "/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .with_state(service)
}

/// Request body key carrying the record name.
fn name_key(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Trainer => "trainerName",
        CatalogKind::Topic => "topicName",
    }
}

/// Response key wrapping the created or updated record.
fn record_key(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Trainer => "trainer",
        CatalogKind::Topic => "topic",
    }
}

fn plural(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Trainer => "trainers",
        CatalogKind::Topic => "training topics",
    }
}

fn singular(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Trainer => "trainer",
        CatalogKind::Topic => "training topic",
    }
}

fn requested_name(kind: CatalogKind, body: &Value) -> Option<String> {
    body.get(name_key(kind))
        .and_then(Value::as_str)
        .map(str::to_string)
}

async fn list_records(State(service): State<CatalogService>) -> Result<Json<Vec<Value>>, ApiError> {
    let failure = format!("Failed to get {}", plural(service.kind()));
    let records = service.list().await.or_fail(&failure)?;
    Ok(Json(records.iter().map(|doc| doc.to_json_with_id()).collect()))
}

async fn get_record(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let failure = format!("Failed to get {}", singular(service.kind()));
    let record = service.get(&id).await.or_fail(&failure)?;
    Ok(Json(record.to_json_with_id()))
}

async fn create_record(
    State(service): State<CatalogService>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let kind = service.kind();
    let failure = format!("Failed to add {}", singular(kind));
    let record = service
        .create(requested_name(kind, &body))
        .await
        .or_fail(&failure)?;

    let mut response = json!({
        "message": format!("{} added", kind.label()),
        "id": record.id,
    });
    response[record_key(kind)] = record.to_json_with_id();
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_record(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let kind = service.kind();
    let failure = format!("Failed to update {}", singular(kind));
    let record = service
        .update(&id, requested_name(kind, &body))
        .await
        .or_fail(&failure)?;

    let mut response = json!({
        "message": format!("{} updated", kind.label()),
        "id": id,
    });
    response[record_key(kind)] = record.to_json_with_id();
    Ok(Json(response))
}

async fn delete_record(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let kind = service.kind();
    let failure = format!("Failed to delete {}", singular(kind));
    service.delete(&id).await.or_fail(&failure)?;
    Ok(Json(json!({ "message": format!("{} deleted", kind.label()) })))
}
