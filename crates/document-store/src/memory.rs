use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    NewOrder, NewWorker, Order, OrderId, OrderPatch, OrderQuery, OrderUpdate, Result, Worker,
    WorkerId, WorkerPatch, store::DocumentStore,
};

/// In-memory document store.
///
/// Provides the same interface as the PostgreSQL implementation. Each
/// operation holds the collection's write lock for its whole duration, which
/// makes the aggregate primitives atomic.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    orders: Arc<RwLock<Vec<Order>>>,
    workers: Arc<RwLock<Vec<Worker>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Clears both collections.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
        self.workers.write().await.clear();
    }

    async fn modify_worker<F>(&self, id: WorkerId, f: F) -> Option<Worker>
    where
        F: FnOnce(&mut Worker) + Send,
    {
        let mut workers = self.workers.write().await;
        let worker = workers.iter_mut().find(|w| w.id == id)?;
        f(worker);
        Some(worker.clone())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order> {
        let order = order.into_order(OrderId::new());
        self.orders.write().await.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().filter(|o| query.matches(o)).cloned().collect())
    }

    async fn count_orders(&self, query: OrderQuery) -> Result<u64> {
        let orders = self.orders.read().await;
        Ok(orders.iter().filter(|o| query.matches(o)).count() as u64)
    }

    async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<Option<OrderUpdate>> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        let previous = order.clone();
        patch.apply(order);
        Ok(Some(OrderUpdate {
            previous,
            current: order.clone(),
        }))
    }

    async fn delete_order(&self, id: OrderId) -> Result<Option<Order>> {
        let mut orders = self.orders.write().await;
        let removed = orders
            .iter()
            .position(|o| o.id == id)
            .map(|index| orders.remove(index));
        Ok(removed)
    }

    async fn insert_worker(&self, worker: NewWorker) -> Result<Worker> {
        let worker = worker.into_worker(WorkerId::new());
        self.workers.write().await.push(worker.clone());
        Ok(worker)
    }

    async fn get_worker(&self, id: WorkerId) -> Result<Option<Worker>> {
        let workers = self.workers.read().await;
        Ok(workers.iter().find(|w| w.id == id).cloned())
    }

    async fn list_workers(&self) -> Result<Vec<Worker>> {
        Ok(self.workers.read().await.clone())
    }

    async fn update_worker(&self, id: WorkerId, patch: WorkerPatch) -> Result<Option<Worker>> {
        Ok(self.modify_worker(id, |w| patch.apply(w)).await)
    }

    async fn delete_worker(&self, id: WorkerId) -> Result<Option<Worker>> {
        let mut workers = self.workers.write().await;
        let removed = workers
            .iter()
            .position(|w| w.id == id)
            .map(|index| workers.remove(index));
        Ok(removed)
    }

    async fn increment_total_orders(&self, id: WorkerId, delta: i64) -> Result<Option<Worker>> {
        Ok(self.modify_worker(id, |w| w.total_orders += delta).await)
    }

    async fn add_order_number(&self, id: WorkerId, number: &str) -> Result<Option<Worker>> {
        Ok(self
            .modify_worker(id, |w| {
                if !w.orders.iter().any(|n| n == number) {
                    w.orders.push(number.to_string());
                }
            })
            .await)
    }

    async fn remove_order_number(&self, id: WorkerId, number: &str) -> Result<Option<Worker>> {
        // Orders stay read-locked across the worker write.
        let orders = self.orders.read().await;
        let still_carried = orders
            .iter()
            .any(|o| o.worker == Some(id) && o.number == number);
        let worker = self
            .modify_worker(id, |w| {
                if !still_carried {
                    w.orders.retain(|n| n != number);
                }
            })
            .await;
        drop(orders);
        Ok(worker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentStoreExt, LineItem};

    fn new_order(number: &str, worker: Option<WorkerId>) -> NewOrder {
        NewOrder {
            number: number.to_string(),
            address: "Main St 1".to_string(),
            items: vec![LineItem {
                name: "Aspirin".to_string(),
                quantity: "2".to_string(),
                price: "4.50".to_string(),
            }],
            price: 9.0,
            status: "new".to_string(),
            worker,
        }
    }

    fn new_worker(first: &str, last: &str) -> NewWorker {
        NewWorker {
            first_name: first.to_string(),
            last_name: last.to_string(),
            middle_name: None,
        }
    }

    #[tokio::test]
    async fn insert_and_get_order() {
        let store = InMemoryStore::new();
        let order = store.insert_order(new_order("O1", None)).await.unwrap();

        let fetched = store.get_order(order.id).await.unwrap();
        assert_eq!(fetched, Some(order));
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn list_orders_preserves_insertion_order() {
        let store = InMemoryStore::new();
        for number in ["O1", "O2", "O3"] {
            store.insert_order(new_order(number, None)).await.unwrap();
        }

        let numbers: Vec<_> = store
            .list_orders(OrderQuery::new())
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.number)
            .collect();
        assert_eq!(numbers, vec!["O1", "O2", "O3"]);
    }

    #[tokio::test]
    async fn update_order_reports_previous_state() {
        let store = InMemoryStore::new();
        let worker = WorkerId::new();
        let order = store
            .insert_order(new_order("O1", Some(worker)))
            .await
            .unwrap();

        let update = store
            .update_order(
                order.id,
                OrderPatch {
                    worker: Some(None),
                    status: Some("done".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(update.previous.worker, Some(worker));
        assert_eq!(update.current.worker, None);
        assert_eq!(update.current.status, "done");
        assert_eq!(update.current.address, "Main St 1");
    }

    #[tokio::test]
    async fn update_missing_order_returns_none() {
        let store = InMemoryStore::new();
        let result = store
            .update_order(OrderId::new(), OrderPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_order_returns_final_state() {
        let store = InMemoryStore::new();
        let order = store.insert_order(new_order("O1", None)).await.unwrap();

        let removed = store.delete_order(order.id).await.unwrap();
        assert_eq!(removed, Some(order.clone()));
        assert!(store.get_order(order.id).await.unwrap().is_none());
        assert!(store.delete_order(order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn new_worker_starts_with_empty_aggregates() {
        let store = InMemoryStore::new();
        let worker = store.insert_worker(new_worker("Ann", "Lee")).await.unwrap();
        assert_eq!(worker.total_orders, 0);
        assert!(worker.orders.is_empty());
    }

    #[tokio::test]
    async fn add_order_number_is_set_like() {
        let store = InMemoryStore::new();
        let worker = store.insert_worker(new_worker("Ann", "Lee")).await.unwrap();

        store.add_order_number(worker.id, "O1").await.unwrap();
        let updated = store.add_order_number(worker.id, "O1").await.unwrap().unwrap();
        assert_eq!(updated.orders, vec!["O1"]);

        let updated = store
            .remove_order_number(worker.id, "O1")
            .await
            .unwrap()
            .unwrap();
        assert!(updated.orders.is_empty());
    }

    #[tokio::test]
    async fn remove_order_number_keeps_number_still_carried() {
        let store = InMemoryStore::new();
        let worker = store.insert_worker(new_worker("Ann", "Lee")).await.unwrap();
        store
            .insert_order(new_order("O1", Some(worker.id)))
            .await
            .unwrap();
        store.add_order_number(worker.id, "O1").await.unwrap();

        let updated = store
            .remove_order_number(worker.id, "O1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.orders, vec!["O1"]);
    }

    #[tokio::test]
    async fn aggregate_primitives_on_missing_worker_return_none() {
        let store = InMemoryStore::new();
        let missing = WorkerId::new();
        assert!(store.increment_total_orders(missing, 1).await.unwrap().is_none());
        assert!(store.add_order_number(missing, "O1").await.unwrap().is_none());
        assert!(store.remove_order_number(missing, "O1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let store = InMemoryStore::new();
        let worker = store.insert_worker(new_worker("Ann", "Lee")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.increment_total_orders(worker.id, 1).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let worker = store.get_worker(worker.id).await.unwrap().unwrap();
        assert_eq!(worker.total_orders, 50);
    }

    #[tokio::test]
    async fn worker_patch_writes_aggregates_directly() {
        let store = InMemoryStore::new();
        let worker = store.insert_worker(new_worker("Ann", "Lee")).await.unwrap();

        let updated = store
            .update_worker(
                worker.id,
                WorkerPatch {
                    middle_name: Some(Some("May".to_string())),
                    orders: Some(vec!["O7".to_string()]),
                    total_orders: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.first_name, "Ann");
        assert_eq!(updated.middle_name.as_deref(), Some("May"));
        assert_eq!(updated.orders, vec!["O7"]);
        assert_eq!(updated.total_orders, 1);
    }

    #[tokio::test]
    async fn deleting_worker_leaves_orders_alone() {
        let store = InMemoryStore::new();
        let worker = store.insert_worker(new_worker("Ann", "Lee")).await.unwrap();
        store
            .insert_order(new_order("O1", Some(worker.id)))
            .await
            .unwrap();

        store.delete_worker(worker.id).await.unwrap();

        assert!(store.get_worker(worker.id).await.unwrap().is_none());
        assert_eq!(store.assigned_orders(worker.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn count_orders_filters_by_worker_and_number() {
        let store = InMemoryStore::new();
        let ann = WorkerId::new();
        let bob = WorkerId::new();
        store.insert_order(new_order("O1", Some(ann))).await.unwrap();
        store.insert_order(new_order("O1", Some(ann))).await.unwrap();
        store.insert_order(new_order("O1", Some(bob))).await.unwrap();
        store.insert_order(new_order("O2", Some(ann))).await.unwrap();

        let ann_o1 = OrderQuery::for_worker(ann).number("O1");
        assert_eq!(store.count_orders(ann_o1).await.unwrap(), 2);
        let bob_o2 = OrderQuery::for_worker(bob).number("O2");
        assert_eq!(store.count_orders(bob_o2).await.unwrap(), 0);
        assert_eq!(
            store.count_orders(OrderQuery::for_worker(ann)).await.unwrap(),
            3
        );
    }
}
