//! Orders: request schemas and the order service.

mod request;
mod service;

pub use request::{ItemDraft, OrderChanges, OrderDraft};
pub use service::{OrderService, ResolvedOrder};
