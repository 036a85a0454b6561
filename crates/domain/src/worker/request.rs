//! Typed request schemas for worker writes.

use document_store::{NewWorker, WorkerPatch};
use serde::Deserialize;

use crate::validation::{ValidationError, Validator};

/// Body of a worker creation request.
///
/// Aggregate fields sent by the client are ignored; a new worker always
/// starts with no orders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
}

impl WorkerDraft {
    /// Validates the draft into a store write.
    pub fn validate(self) -> Result<NewWorker, ValidationError> {
        let mut v = Validator::new();
        let first_name = v.required_text("firstName", self.first_name);
        let last_name = v.required_text("lastName", self.last_name);
        v.finish()?;

        Ok(NewWorker {
            first_name,
            last_name,
            middle_name: self.middle_name.filter(|m| !m.trim().is_empty()),
        })
    }
}

/// Body of a worker update request.
///
/// Only the name fields are writable here. `middleName: null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::nullable")]
    pub middle_name: Option<Option<String>>,
}

impl WorkerChanges {
    /// Validates the changes into a store patch.
    pub fn validate(self) -> Result<WorkerPatch, ValidationError> {
        let mut v = Validator::new();
        let patch = WorkerPatch {
            first_name: v.optional_text("firstName", self.first_name),
            last_name: v.optional_text("lastName", self.last_name),
            middle_name: self
                .middle_name
                .map(|m| m.filter(|m| !m.trim().is_empty())),
            ..Default::default()
        };
        if patch.is_empty() {
            v.reject("body", "must change at least one field");
        }
        v.finish()?;
        Ok(patch)
    }
}
