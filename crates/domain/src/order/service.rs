//! Order service: CRUD over order documents.

use std::collections::HashMap;

use common::{OrderId, WorkerId};
use document_store::{DocumentStore, LineItem, Order, OrderQuery, OrderUpdate, Worker};

use crate::error::DomainError;

use super::{OrderChanges, OrderDraft};

/// An order with its worker reference expanded to the full worker.
///
/// `worker` is `None` both for unassigned orders and for orders whose
/// referenced worker no longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOrder {
    pub id: OrderId,
    pub number: String,
    pub address: String,
    pub items: Vec<LineItem>,
    pub price: f64,
    pub status: String,
    pub worker: Option<Worker>,
}

impl ResolvedOrder {
    fn new(order: Order, worker: Option<Worker>) -> Self {
        Self {
            id: order.id,
            number: order.number,
            address: order.address,
            items: order.items,
            price: order.price,
            status: order.status,
            worker,
        }
    }
}

/// Service for order documents.
///
/// Enforces required fields only. Keeping worker aggregates in step with
/// order writes is the job of [`AggregateSynchronizer`].
///
/// [`AggregateSynchronizer`]: crate::AggregateSynchronizer
pub struct OrderService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validates and persists a new order.
    #[tracing::instrument(skip(self, draft))]
    pub async fn create(&self, draft: OrderDraft) -> Result<Order, DomainError> {
        let new_order = draft.validate()?;
        let order = self.store.insert_order(new_order).await?;
        tracing::debug!(order_id = %order.id, number = %order.number, "order created");
        Ok(order)
    }

    /// Loads an order by id with its worker resolved.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<ResolvedOrder, DomainError> {
        let order = self
            .store
            .get_order(id)
            .await?
            .ok_or_else(|| DomainError::order_not_found(id))?;
        self.resolve(order).await
    }

    /// Lists all orders with their workers resolved.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ResolvedOrder>, DomainError> {
        let orders = self.store.list_orders(OrderQuery::new()).await?;
        let workers: HashMap<WorkerId, Worker> = self
            .store
            .list_workers()
            .await?
            .into_iter()
            .map(|w| (w.id, w))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| {
                let worker = order.worker.and_then(|id| workers.get(&id).cloned());
                ResolvedOrder::new(order, worker)
            })
            .collect())
    }

    /// Validates and applies changes to an order.
    ///
    /// Returns the order as it was before and after the write.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: OrderId,
        changes: OrderChanges,
    ) -> Result<OrderUpdate, DomainError> {
        let patch = changes.validate()?;
        self.store
            .update_order(id, patch)
            .await?
            .ok_or_else(|| DomainError::order_not_found(id))
    }

    /// Removes an order, returning its final state.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) -> Result<Order, DomainError> {
        self.store
            .delete_order(id)
            .await?
            .ok_or_else(|| DomainError::order_not_found(id))
    }

    /// Expands an order's worker reference.
    pub async fn resolve(&self, order: Order) -> Result<ResolvedOrder, DomainError> {
        let worker = match order.worker {
            Some(id) => self.store.get_worker(id).await?,
            None => None,
        };
        Ok(ResolvedOrder::new(order, worker))
    }
}
