//! Worker CRUD and recount endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::WorkerId;
use document_store::{DocumentStore, Worker};
use domain::{WorkerChanges, WorkerDraft};
use serde::Serialize;

use super::parse_id;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub orders: Vec<String>,
    pub total_orders: i64,
}

impl From<Worker> for WorkerResponse {
    fn from(worker: Worker) -> Self {
        Self {
            id: worker.id.to_string(),
            first_name: worker.first_name,
            last_name: worker.last_name,
            middle_name: worker.middle_name,
            orders: worker.orders,
            total_orders: worker.total_orders,
        }
    }
}

/// GET /api/workers — list all workers.
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<WorkerResponse>>, ApiError> {
    let workers = state.workers.list().await?;
    Ok(Json(workers.into_iter().map(Into::into).collect()))
}

/// GET /api/workers/:id — load one worker.
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<WorkerResponse>, ApiError> {
    let worker_id: WorkerId = parse_id("Worker", &id)?;
    let worker = state.workers.get(worker_id).await?;
    Ok(Json(worker.into()))
}

/// POST /api/workers — create a worker with no orders.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<WorkerDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<WorkerResponse>), ApiError> {
    let Json(draft) = payload?;
    let worker = state.workers.create(draft).await?;
    Ok((StatusCode::CREATED, Json(worker.into())))
}

/// PUT /api/workers/:id — rename a worker.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<WorkerChanges>, JsonRejection>,
) -> Result<Json<WorkerResponse>, ApiError> {
    let worker_id: WorkerId = parse_id("Worker", &id)?;
    let Json(changes) = payload?;
    let worker = state.workers.update(worker_id, changes).await?;
    Ok(Json(worker.into()))
}

/// DELETE /api/workers/:id — delete a worker; its orders keep the reference.
#[tracing::instrument(skip(state))]
pub async fn delete<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<WorkerResponse>, ApiError> {
    let worker_id: WorkerId = parse_id("Worker", &id)?;
    let worker = state.workers.delete(worker_id).await?;
    Ok(Json(worker.into()))
}

/// PUT /api/workers/:id/updateOrders — recount the worker's aggregates.
#[tracing::instrument(skip(state))]
pub async fn recount<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<WorkerResponse>, ApiError> {
    let worker_id: WorkerId = parse_id("Worker", &id)?;
    let worker = state.workers.recount(worker_id).await?;
    Ok(Json(worker.into()))
}
