use crate::{Order, WorkerId};

/// Filter over the orders collection.
///
/// An empty query matches every order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    /// Only orders assigned to this worker.
    pub worker: Option<WorkerId>,

    /// Only orders with this business number.
    pub number: Option<String>,
}

impl OrderQuery {
    /// Creates a query matching all orders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for orders assigned to a worker.
    pub fn for_worker(worker: WorkerId) -> Self {
        Self {
            worker: Some(worker),
            ..Default::default()
        }
    }

    /// Filters by assigned worker.
    pub fn worker(mut self, worker: WorkerId) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Filters by order number.
    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    /// Returns true if the order satisfies every filter.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(worker) = self.worker
            && order.worker != Some(worker)
        {
            return false;
        }
        if let Some(ref number) = self.number
            && &order.number != number
        {
            return false;
        }
        true
    }
}
