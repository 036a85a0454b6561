//! Worker service: CRUD over worker documents and aggregate repair.

use common::WorkerId;
use document_store::{DocumentStore, DocumentStoreExt, StoreError, Worker, WorkerPatch};

use crate::error::DomainError;

use super::{WorkerChanges, WorkerDraft};

/// Service for worker documents.
pub struct WorkerService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> WorkerService<S> {
    /// Creates a new worker service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validates and persists a new worker with empty aggregates.
    #[tracing::instrument(skip(self, draft))]
    pub async fn create(&self, draft: WorkerDraft) -> Result<Worker, DomainError> {
        let new_worker = draft.validate()?;
        let worker = self.store.insert_worker(new_worker).await?;
        tracing::debug!(worker_id = %worker.id, "worker created");
        Ok(worker)
    }

    /// Loads a worker by id.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: WorkerId) -> Result<Worker, DomainError> {
        self.store
            .get_worker(id)
            .await?
            .ok_or_else(|| DomainError::worker_not_found(id))
    }

    /// Lists all workers.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Worker>, DomainError> {
        Ok(self.store.list_workers().await?)
    }

    /// Validates and applies changes to a worker's names.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: WorkerId,
        changes: WorkerChanges,
    ) -> Result<Worker, DomainError> {
        let patch = changes.validate()?;
        self.store
            .update_worker(id, patch)
            .await?
            .ok_or_else(|| DomainError::worker_not_found(id))
    }

    /// Removes a worker. Orders that reference it keep the dangling reference.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: WorkerId) -> Result<Worker, DomainError> {
        self.store
            .delete_worker(id)
            .await?
            .ok_or_else(|| DomainError::worker_not_found(id))
    }

    /// Adds `delta` to the worker's order count. `None` if the worker is absent.
    pub async fn adjust_total_orders(
        &self,
        id: WorkerId,
        delta: i64,
    ) -> Result<Option<Worker>, StoreError> {
        self.store.increment_total_orders(id, delta).await
    }

    /// Adds an order number to the worker's list if absent.
    pub async fn add_order_number(
        &self,
        id: WorkerId,
        number: &str,
    ) -> Result<Option<Worker>, StoreError> {
        self.store.add_order_number(id, number).await
    }

    /// Removes an order number from the worker's list, unless another order
    /// still assigned to the worker carries the same number. The check and
    /// the removal are one store operation.
    pub async fn release_order_number(
        &self,
        id: WorkerId,
        number: &str,
    ) -> Result<Option<Worker>, StoreError> {
        self.store.remove_order_number(id, number).await
    }

    /// Recomputes the worker's aggregates from the orders collection.
    ///
    /// `totalOrders` becomes the number of orders referencing the worker and
    /// `orders` their distinct numbers in store order. Running it twice in a
    /// row yields the same result.
    #[tracing::instrument(skip(self))]
    pub async fn recount(&self, id: WorkerId) -> Result<Worker, DomainError> {
        let assigned = self.store.assigned_orders(id).await?;
        let total_orders = assigned.len() as i64;

        let mut numbers: Vec<String> = Vec::with_capacity(assigned.len());
        for order in assigned {
            if !numbers.contains(&order.number) {
                numbers.push(order.number);
            }
        }

        let patch = WorkerPatch {
            orders: Some(numbers),
            total_orders: Some(total_orders),
            ..Default::default()
        };
        let worker = self
            .store
            .update_worker(id, patch)
            .await?
            .ok_or_else(|| DomainError::worker_not_found(id))?;

        metrics::counter!("worker_recounts_total").increment(1);
        tracing::info!(worker_id = %id, total_orders, "worker aggregates recounted");
        Ok(worker)
    }
}
