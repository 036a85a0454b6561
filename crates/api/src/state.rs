//! Application context shared by all handlers.

use document_store::DocumentStore;
use domain::{AggregateSynchronizer, OrderService, WorkerService};

/// Shared application state accessible from all handlers.
///
/// Owns the store handle for the lifetime of the server; [`AppState::close`]
/// releases it at shutdown.
pub struct AppState<S: DocumentStore> {
    pub orders: OrderService<S>,
    pub workers: WorkerService<S>,
    pub synchronizer: AggregateSynchronizer<S>,
    store: S,
}

impl<S: DocumentStore + Clone> AppState<S> {
    /// Builds the services over one store handle.
    pub fn new(store: S) -> Self {
        Self {
            orders: OrderService::new(store.clone()),
            workers: WorkerService::new(store.clone()),
            synchronizer: AggregateSynchronizer::new(store.clone()),
            store,
        }
    }
}

impl<S: DocumentStore> AppState<S> {
    /// Returns the underlying store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Releases the store's resources.
    pub async fn close(&self) {
        self.store.close().await;
    }
}
