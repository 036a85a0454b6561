//! Workers: request schemas and the worker service.

mod request;
mod service;

pub use request::{WorkerChanges, WorkerDraft};
pub use service::WorkerService;
