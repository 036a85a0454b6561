//! Typed request schemas for order writes.

use document_store::{LineItem, NewOrder, OrderPatch};
use serde::Deserialize;

use crate::validation::{NumberInput, ValidationError, Validator};

/// One line item as sent by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemDraft {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::text_or_number")]
    pub quantity: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::text_or_number")]
    pub price: Option<String>,
}

/// Body of an order creation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderDraft {
    pub number: Option<String>,
    pub address: Option<String>,
    pub items: Option<Vec<ItemDraft>>,
    #[serde(default, deserialize_with = "crate::validation::number_or_text")]
    pub price: Option<NumberInput>,
    pub status: Option<String>,
    /// Worker id, or absent/`null` for an unassigned order.
    pub worker: Option<String>,
}

impl OrderDraft {
    /// Validates the draft into a store write.
    pub fn validate(self) -> Result<NewOrder, ValidationError> {
        let mut v = Validator::new();
        let number = v.required_text("number", self.number);
        let address = v.required_text("address", self.address);
        let price = v.required_price("price", self.price);
        let status = v.required_text("status", self.status);
        let items = validate_items(&mut v, self.items.unwrap_or_default());
        let worker = v.worker_ref("worker", self.worker);
        v.finish()?;

        Ok(NewOrder {
            number,
            address,
            items,
            price,
            status,
            worker,
        })
    }
}

/// Body of an order update request.
///
/// Absent fields keep their stored value. `worker: null` unassigns the order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderChanges {
    pub number: Option<String>,
    pub address: Option<String>,
    pub items: Option<Vec<ItemDraft>>,
    #[serde(default, deserialize_with = "crate::validation::number_or_text")]
    pub price: Option<NumberInput>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::nullable")]
    pub worker: Option<Option<String>>,
}

impl OrderChanges {
    /// Validates the changes into a store patch.
    ///
    /// A request that changes nothing is rejected.
    pub fn validate(self) -> Result<OrderPatch, ValidationError> {
        let mut v = Validator::new();
        let patch = OrderPatch {
            number: v.optional_text("number", self.number),
            address: v.optional_text("address", self.address),
            items: self.items.map(|items| validate_items(&mut v, items)),
            price: v.optional_price("price", self.price),
            status: v.optional_text("status", self.status),
            worker: self.worker.map(|worker| v.worker_ref("worker", worker)),
        };
        if patch.is_empty() {
            v.reject("body", "must change at least one field");
        }
        v.finish()?;
        Ok(patch)
    }
}

fn validate_items(v: &mut Validator, items: Vec<ItemDraft>) -> Vec<LineItem> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| LineItem {
            name: v.required_text(&format!("items[{i}].name"), item.name),
            quantity: v.required_text(&format!("items[{i}].quantity"), item.quantity),
            price: v.required_text(&format!("items[{i}].price"), item.price),
        })
        .collect()
}
