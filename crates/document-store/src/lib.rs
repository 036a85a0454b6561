//! Document store client for the order-management service.
//!
//! Two independent collections, orders and workers, joined only by the weak
//! `worker` reference on an order. Worker aggregate fields are changed through
//! dedicated atomic primitives rather than load-and-save.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;
pub mod store;

pub use common::{OrderId, WorkerId};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::OrderQuery;
pub use record::{
    LineItem, NewOrder, NewWorker, Order, OrderPatch, OrderUpdate, Worker, WorkerPatch,
};
pub use store::{DocumentStore, DocumentStoreExt};
