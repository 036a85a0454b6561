//! Persisted document shapes and the write shapes used to change them.

use serde::{Deserialize, Serialize};

use crate::{OrderId, WorkerId};

/// One line of an order.
///
/// Quantity and price are kept as the text the client sent; they are never
/// parsed or summed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: String,
    pub price: String,
}

/// A stored order document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub number: String,
    pub address: String,
    pub items: Vec<LineItem>,
    pub price: f64,
    pub status: String,
    pub worker: Option<WorkerId>,
}

impl Order {
    /// Returns the `(worker, number)` pair this order contributes to a
    /// worker's aggregates, if it is assigned.
    pub fn assignment(&self) -> Option<(WorkerId, &str)> {
        self.worker.map(|worker| (worker, self.number.as_str()))
    }
}

/// Fields for a new order. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub number: String,
    pub address: String,
    pub items: Vec<LineItem>,
    pub price: f64,
    pub status: String,
    pub worker: Option<WorkerId>,
}

impl NewOrder {
    pub(crate) fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            number: self.number,
            address: self.address,
            items: self.items,
            price: self.price,
            status: self.status,
            worker: self.worker,
        }
    }
}

/// Partial replacement of an order's mutable fields.
///
/// `None` leaves a field untouched. For `worker`, `Some(None)` clears the
/// assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub number: Option<String>,
    pub address: Option<String>,
    pub items: Option<Vec<LineItem>>,
    pub price: Option<f64>,
    pub status: Option<String>,
    pub worker: Option<Option<WorkerId>>,
}

impl OrderPatch {
    /// Returns true if the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.address.is_none()
            && self.items.is_none()
            && self.price.is_none()
            && self.status.is_none()
            && self.worker.is_none()
    }

    pub(crate) fn apply(self, order: &mut Order) {
        if let Some(number) = self.number {
            order.number = number;
        }
        if let Some(address) = self.address {
            order.address = address;
        }
        if let Some(items) = self.items {
            order.items = items;
        }
        if let Some(price) = self.price {
            order.price = price;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(worker) = self.worker {
            order.worker = worker;
        }
    }
}

/// An order as it was immediately before and after an update.
///
/// Both states come from the same atomic store operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderUpdate {
    pub previous: Order,
    pub current: Order,
}

/// A stored worker document.
///
/// `orders` and `total_orders` are denormalized aggregates of the orders
/// collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub orders: Vec<String>,
    pub total_orders: i64,
}

/// Fields for a new worker. Aggregates start empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorker {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
}

impl NewWorker {
    pub(crate) fn into_worker(self, id: WorkerId) -> Worker {
        Worker {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            middle_name: self.middle_name,
            orders: Vec::new(),
            total_orders: 0,
        }
    }
}

/// Partial update of a worker, including direct writes to its aggregates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<Option<String>>,
    pub orders: Option<Vec<String>>,
    pub total_orders: Option<i64>,
}

impl WorkerPatch {
    /// Returns true if the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.middle_name.is_none()
            && self.orders.is_none()
            && self.total_orders.is_none()
    }

    pub(crate) fn apply(self, worker: &mut Worker) {
        if let Some(first_name) = self.first_name {
            worker.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            worker.last_name = last_name;
        }
        if let Some(middle_name) = self.middle_name {
            worker.middle_name = middle_name;
        }
        if let Some(orders) = self.orders {
            worker.orders = orders;
        }
        if let Some(total_orders) = self.total_orders {
            worker.total_orders = total_orders;
        }
    }
}
