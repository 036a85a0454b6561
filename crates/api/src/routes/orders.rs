//! Order CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::OrderId;
use document_store::{DocumentStore, LineItem, Order};
use domain::{OrderChanges, OrderDraft, ResolvedOrder};
use serde::Serialize;

use super::parse_id;
use super::workers::WorkerResponse;
use crate::error::ApiError;
use crate::state::AppState;

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub number: String,
    pub address: String,
    pub items: Vec<OrderItemResponse>,
    pub price: f64,
    pub status: String,
    pub worker: Option<WorkerResponse>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub name: String,
    pub quantity: String,
    pub price: String,
}

impl From<LineItem> for OrderItemResponse {
    fn from(item: LineItem) -> Self {
        Self {
            name: item.name,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

impl From<ResolvedOrder> for OrderResponse {
    fn from(order: ResolvedOrder) -> Self {
        Self {
            id: order.id.to_string(),
            number: order.number,
            address: order.address,
            items: order.items.into_iter().map(Into::into).collect(),
            price: order.price,
            status: order.status,
            worker: order.worker.map(Into::into),
        }
    }
}

/// A deleted order. Its worker reference is returned as an id.
#[derive(Serialize)]
pub struct DeletedOrderResponse {
    pub id: String,
    pub number: String,
    pub address: String,
    pub items: Vec<OrderItemResponse>,
    pub price: f64,
    pub status: String,
    pub worker: Option<String>,
}

impl From<Order> for DeletedOrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            number: order.number,
            address: order.address,
            items: order.items.into_iter().map(Into::into).collect(),
            price: order.price,
            status: order.status,
            worker: order.worker.map(|w| w.to_string()),
        }
    }
}

// -- Handlers --

/// GET /api/orders — list all orders with their workers resolved.
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.list().await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /api/orders/:id — load one order with its worker resolved.
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id: OrderId = parse_id("Order", &id)?;
    let order = state.orders.get(order_id).await?;
    Ok(Json(order.into()))
}

/// POST /api/orders — create an order and credit its worker.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<OrderDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let Json(draft) = payload?;
    let order = state.synchronizer.create_order(draft).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// PUT /api/orders/:id — change an order and move its worker contribution.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<OrderChanges>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id: OrderId = parse_id("Order", &id)?;
    let Json(changes) = payload?;
    let order = state.synchronizer.update_order(order_id, changes).await?;
    Ok(Json(order.into()))
}

/// DELETE /api/orders/:id — delete an order and release its worker.
#[tracing::instrument(skip(state))]
pub async fn delete<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedOrderResponse>, ApiError> {
    let order_id: OrderId = parse_id("Order", &id)?;
    let order = state.synchronizer.delete_order(order_id).await?;
    Ok(Json(order.into()))
}
