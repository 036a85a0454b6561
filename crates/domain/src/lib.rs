//! Domain layer for the order-management service.
//!
//! This crate provides:
//! - [`OrderService`], CRUD over order documents with worker resolution
//! - [`WorkerService`], CRUD over worker documents plus the recount repair
//! - [`AggregateSynchronizer`], which keeps each worker's `totalOrders` and
//!   `orders` aggregates in step with order assignment changes
//! - typed request schemas validated into store write shapes

pub mod error;
pub mod order;
pub mod synchronizer;
pub mod validation;
pub mod worker;

pub use document_store::{LineItem, Order, OrderUpdate, Worker};
pub use error::DomainError;
pub use order::{ItemDraft, OrderChanges, OrderDraft, OrderService, ResolvedOrder};
pub use synchronizer::{Adjustment, AggregateSynchronizer, plan_adjustments};
pub use validation::{FieldError, NumberInput, ValidationError};
pub use worker::{WorkerChanges, WorkerDraft, WorkerService};
