//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p document-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use document_store::{
    DocumentStore, DocumentStoreExt, LineItem, NewOrder, NewWorker, OrderPatch, OrderQuery,
    PostgresStore, WorkerId, WorkerPatch,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool, migrated schema and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    let store = PostgresStore::new(pool);
    store.run_migrations().await.unwrap();

    sqlx::query("TRUNCATE TABLE orders, workers")
        .execute(store.pool())
        .await
        .unwrap();

    store
}

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
async fn insert_and_fetch_order_with_items() {
    let store = get_test_store().await;

    let order = store.insert_order(new_order("O1", None)).await.unwrap();
    let fetched = store.get_order(order.id).await.unwrap().unwrap();

    assert_eq!(fetched, order);
    assert_eq!(fetched.items.len(), 1);
    assert_eq!(fetched.items[0].price, "4.50");
}

#[tokio::test]
async fn list_orders_in_insertion_order() {
    let store = get_test_store().await;
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
async fn update_order_captures_previous_worker() {
    let store = get_test_store().await;
    let ann = store.insert_worker(new_worker("Ann", "Lee")).await.unwrap();
    let bob = store.insert_worker(new_worker("Bob", "Ray")).await.unwrap();
    let order = store
        .insert_order(new_order("O1", Some(ann.id)))
        .await
        .unwrap();

    let update = store
        .update_order(
            order.id,
            OrderPatch {
                worker: Some(Some(bob.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(update.previous.worker, Some(ann.id));
    assert_eq!(update.current.worker, Some(bob.id));
    assert_eq!(update.current.number, "O1");
}

#[tokio::test]
async fn update_order_can_unassign() {
    let store = get_test_store().await;
    let order = store
        .insert_order(new_order("O1", Some(WorkerId::new())))
        .await
        .unwrap();

    let update = store
        .update_order(
            order.id,
            OrderPatch {
                worker: Some(None),
                price: Some(0.0),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert!(update.current.worker.is_none());
    assert_eq!(update.current.price, 0.0);
}

#[tokio::test]
async fn delete_order_returns_final_state() {
    let store = get_test_store().await;
    let worker = WorkerId::new();
    let order = store
        .insert_order(new_order("O1", Some(worker)))
        .await
        .unwrap();

    let removed = store.delete_order(order.id).await.unwrap().unwrap();
    assert_eq!(removed.worker, Some(worker));
    assert!(store.delete_order(order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn aggregate_primitives_are_atomic_under_concurrency() {
    let store = get_test_store().await;
    let worker = store.insert_worker(new_worker("Ann", "Lee")).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.increment_total_orders(worker.id, 1).await.unwrap();
            store.add_order_number(worker.id, "O1").await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let worker = store.get_worker(worker.id).await.unwrap().unwrap();
    assert_eq!(worker.total_orders, 20);
    assert_eq!(worker.orders, vec!["O1"]);
}

#[tokio::test]
async fn remove_order_number_by_value() {
    let store = get_test_store().await;
    let worker = store.insert_worker(new_worker("Ann", "Lee")).await.unwrap();
    store.add_order_number(worker.id, "O1").await.unwrap();
    store.add_order_number(worker.id, "O2").await.unwrap();

    let worker = store
        .remove_order_number(worker.id, "O1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(worker.orders, vec!["O2"]);
}

#[tokio::test]
async fn remove_order_number_keeps_number_still_carried() {
    let store = get_test_store().await;
    let worker = store.insert_worker(new_worker("Ann", "Lee")).await.unwrap();
    store
        .insert_order(new_order("O1", Some(worker.id)))
        .await
        .unwrap();
    store.add_order_number(worker.id, "O1").await.unwrap();
    store.add_order_number(worker.id, "O2").await.unwrap();

    let worker = store
        .remove_order_number(worker.id, "O1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(worker.orders, vec!["O1", "O2"]);
}

#[tokio::test]
async fn aggregate_primitives_skip_missing_worker() {
    let store = get_test_store().await;
    let missing = WorkerId::new();

    assert!(store.increment_total_orders(missing, 1).await.unwrap().is_none());
    assert!(store.add_order_number(missing, "O1").await.unwrap().is_none());
}

#[tokio::test]
async fn update_worker_partial_fields() {
    let store = get_test_store().await;
    let worker = store.insert_worker(new_worker("Ann", "Lee")).await.unwrap();

    let updated = store
        .update_worker(
            worker.id,
            WorkerPatch {
                middle_name: Some(Some("May".to_string())),
                total_orders: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.first_name, "Ann");
    assert_eq!(updated.middle_name.as_deref(), Some("May"));
    assert_eq!(updated.total_orders, 3);

    let cleared = store
        .update_worker(
            worker.id,
            WorkerPatch {
                middle_name: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.middle_name.is_none());
    assert_eq!(cleared.total_orders, 3);
}

#[tokio::test]
async fn count_orders_by_worker_and_number() {
    let store = get_test_store().await;
    let ann = WorkerId::new();
    store.insert_order(new_order("O1", Some(ann))).await.unwrap();
    store.insert_order(new_order("O1", Some(ann))).await.unwrap();
    store.insert_order(new_order("O2", Some(ann))).await.unwrap();
    store.insert_order(new_order("O1", None)).await.unwrap();

    let ann_o1 = OrderQuery::for_worker(ann).number("O1");
    assert_eq!(store.count_orders(ann_o1).await.unwrap(), 2);
    assert_eq!(store.assigned_orders(ann).await.unwrap().len(), 3);
    assert_eq!(store.count_orders(OrderQuery::new()).await.unwrap(), 4);
}
