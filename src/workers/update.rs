use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
};
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    auth::AuthenticatedWorker,
    db::{WorkerStore, WorkerUpdate, WorkerUpdateResponse},
    error::AppError,
    web::PathParam,
};

pub const NO_FIELDS_TO_UPDATE: &str = "No fields to update";
pub const WORKER_UPDATED: &str = "Worker updated successfully";

/// Applies a client-supplied partial update to one worker.
///
/// Order of checks: the worker must exist, then every key must be an
/// updatable field; an empty body returns the record untouched without
/// reaching the store's update path.
pub async fn update_worker_data(
    store: &dyn WorkerStore,
    worker_id: i32,
    body: &Map<String, Value>,
) -> Result<WorkerUpdateResponse, AppError> {
    let existing = store
        .find_worker_by_id(worker_id)
        .await?
        .ok_or_else(|| AppError::not_found("Worker not found"))?;

    let update = WorkerUpdate::from_json(body)?;

    if update.is_empty() {
        return Ok(WorkerUpdateResponse {
            message: NO_FIELDS_TO_UPDATE.to_string(),
            worker: existing,
        });
    }

    let worker = store.update_worker_fields(worker_id, &update).await?;
    info!("Worker {} updated {} field(s)", worker_id, update.len());

    Ok(WorkerUpdateResponse {
        message: WORKER_UPDATED.to_string(),
        worker,
    })
}

/// PATCH /eusou/workers/update-data/:worker_id
pub async fn update_worker_handler(
    auth: AuthenticatedWorker,
    State(store): State<Arc<dyn WorkerStore>>,
    PathParam(worker_id): PathParam<i32>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<WorkerUpdateResponse>, AppError> {
    auth.ensure_owner(worker_id)?;

    let response = update_worker_data(store.as_ref(), worker_id, &body).await?;
    Ok(Json(response))
}
