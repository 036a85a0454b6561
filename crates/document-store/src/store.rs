use async_trait::async_trait;

use crate::{
    NewOrder, NewWorker, Order, OrderId, OrderPatch, OrderQuery, OrderUpdate, Result, Worker,
    WorkerId, WorkerPatch,
};

/// Core trait for document store backends.
///
/// A backend owns the orders and workers collections. Every method is a
/// single store-level operation; callers sequence them. Lookups by id return
/// `None` rather than an error when the document is absent.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new order and returns it with its assigned id.
    async fn insert_order(&self, order: NewOrder) -> Result<Order>;

    /// Fetches an order by id.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists orders matching a query, in insertion order.
    async fn list_orders(&self, query: OrderQuery) -> Result<Vec<Order>>;

    /// Counts orders matching a query.
    async fn count_orders(&self, query: OrderQuery) -> Result<u64>;

    /// Applies a patch to an order.
    ///
    /// The previous and current states are captured atomically, so the
    /// previous worker reference is exactly the one the patch replaced.
    async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<Option<OrderUpdate>>;

    /// Removes an order, returning its final state.
    async fn delete_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Inserts a new worker with empty aggregates.
    async fn insert_worker(&self, worker: NewWorker) -> Result<Worker>;

    /// Fetches a worker by id.
    async fn get_worker(&self, id: WorkerId) -> Result<Option<Worker>>;

    /// Lists all workers in insertion order.
    async fn list_workers(&self) -> Result<Vec<Worker>>;

    /// Applies a partial update to a worker.
    async fn update_worker(&self, id: WorkerId, patch: WorkerPatch) -> Result<Option<Worker>>;

    /// Removes a worker. Orders referencing it are left alone.
    async fn delete_worker(&self, id: WorkerId) -> Result<Option<Worker>>;

    /// Atomically adds `delta` to a worker's `total_orders`.
    async fn increment_total_orders(&self, id: WorkerId, delta: i64) -> Result<Option<Worker>>;

    /// Atomically appends `number` to a worker's `orders` unless already present.
    async fn add_order_number(&self, id: WorkerId, number: &str) -> Result<Option<Worker>>;

    /// Atomically removes `number` from a worker's `orders`, unless an order
    /// still assigned to the worker carries that number.
    async fn remove_order_number(&self, id: WorkerId, number: &str) -> Result<Option<Worker>>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Releases backend resources. The store must not be used afterwards.
    async fn close(&self) {}
}

/// Extension trait providing convenience queries for document stores.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Lists the orders currently assigned to a worker.
    async fn assigned_orders(&self, worker: WorkerId) -> Result<Vec<Order>> {
        self.list_orders(OrderQuery::for_worker(worker)).await
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}
