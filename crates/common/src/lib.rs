//! Identifiers shared by every layer of the order-management service.

pub mod types;

pub use types::{OrderId, WorkerId};
