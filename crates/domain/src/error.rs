//! Domain error types.

use common::OrderId;
use document_store::StoreError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request failed field validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No document exists for the id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// An error occurred in the document store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The order write committed but a worker aggregate write failed.
    ///
    /// The order is not rolled back; a recount of the affected workers
    /// repairs their aggregates.
    #[error("Order {order_id} was saved but worker aggregates are stale: {source}")]
    AggregateSync {
        order_id: OrderId,
        #[source]
        source: StoreError,
    },
}

impl DomainError {
    pub(crate) fn order_not_found(id: impl ToString) -> Self {
        DomainError::NotFound {
            kind: "Order",
            id: id.to_string(),
        }
    }

    pub(crate) fn worker_not_found(id: impl ToString) -> Self {
        DomainError::NotFound {
            kind: "Worker",
            id: id.to_string(),
        }
    }
}
