//! Keeps worker aggregates consistent with order assignment.
//!
//! Every order write goes through [`AggregateSynchronizer`]: the order is
//! written first, then the affected workers' `totalOrders` and `orders` are
//! adjusted with atomic store primitives, one worker at a time. Which
//! adjustments to make is decided by [`plan_adjustments`] from the order's
//! assignment before and after the write.

use common::{OrderId, WorkerId};
use document_store::{DocumentStore, Order, StoreError};

use crate::error::DomainError;
use crate::order::{OrderChanges, OrderDraft, OrderService, ResolvedOrder};
use crate::worker::WorkerService;

/// A change to one worker's aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adjustment {
    /// The order now counts toward the worker: +1 and add its number.
    Attach { worker: WorkerId, number: String },
    /// The order no longer counts toward the worker: -1 and drop its number.
    Release { worker: WorkerId, number: String },
    /// Same worker, renumbered order: swap the number, count unchanged.
    Renumber {
        worker: WorkerId,
        from: String,
        to: String,
    },
}

impl Adjustment {
    fn worker(&self) -> WorkerId {
        match self {
            Adjustment::Attach { worker, .. }
            | Adjustment::Release { worker, .. }
            | Adjustment::Renumber { worker, .. } => *worker,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Adjustment::Attach { .. } => "attach",
            Adjustment::Release { .. } => "release",
            Adjustment::Renumber { .. } => "renumber",
        }
    }
}

/// Decides the worker adjustments for an order moving from one assignment
/// to another.
///
/// Assignments compare by worker id. An order that keeps its worker and
/// number needs nothing. Releases come before attaches.
pub fn plan_adjustments(
    before: Option<(WorkerId, &str)>,
    after: Option<(WorkerId, &str)>,
) -> Vec<Adjustment> {
    match (before, after) {
        (Some((old, from)), Some((new, to))) if old == new => {
            if from == to {
                Vec::new()
            } else {
                vec![Adjustment::Renumber {
                    worker: old,
                    from: from.to_string(),
                    to: to.to_string(),
                }]
            }
        }
        (before, after) => before
            .map(|(worker, number)| Adjustment::Release {
                worker,
                number: number.to_string(),
            })
            .into_iter()
            .chain(after.map(|(worker, number)| Adjustment::Attach {
                worker,
                number: number.to_string(),
            }))
            .collect(),
    }
}

/// Coordinates order writes with worker aggregate updates.
///
/// Holds no state of its own. The order write always happens before the
/// worker writes; if a worker write fails the order write stands and the
/// error is returned as [`DomainError::AggregateSync`].
pub struct AggregateSynchronizer<S: DocumentStore> {
    orders: OrderService<S>,
    workers: WorkerService<S>,
}

impl<S: DocumentStore + Clone> AggregateSynchronizer<S> {
    /// Creates a synchronizer over the given store.
    pub fn new(store: S) -> Self {
        Self {
            orders: OrderService::new(store.clone()),
            workers: WorkerService::new(store),
        }
    }
}

impl<S: DocumentStore> AggregateSynchronizer<S> {
    /// Creates an order and credits its worker.
    #[tracing::instrument(skip(self, draft))]
    pub async fn create_order(&self, draft: OrderDraft) -> Result<ResolvedOrder, DomainError> {
        let order = self.orders.create(draft).await?;
        metrics::counter!("orders_created_total").increment(1);

        let plan = plan_adjustments(None, order.assignment());
        self.apply(order.id, plan).await?;
        self.orders.resolve(order).await
    }

    /// Updates an order and moves its contribution between workers.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_order(
        &self,
        id: OrderId,
        changes: OrderChanges,
    ) -> Result<ResolvedOrder, DomainError> {
        let update = self.orders.update(id, changes).await?;
        metrics::counter!("orders_updated_total").increment(1);

        let plan = plan_adjustments(update.previous.assignment(), update.current.assignment());
        self.apply(id, plan).await?;
        self.orders.resolve(update.current).await
    }

    /// Deletes an order and releases its worker's contribution.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<Order, DomainError> {
        let order = self.orders.delete(id).await?;
        metrics::counter!("orders_deleted_total").increment(1);

        let plan = plan_adjustments(order.assignment(), None);
        self.apply(id, plan).await?;
        Ok(order)
    }

    async fn apply(&self, order_id: OrderId, plan: Vec<Adjustment>) -> Result<(), DomainError> {
        for adjustment in plan {
            let kind = adjustment.kind();
            let worker = adjustment.worker();

            match self.apply_one(adjustment).await {
                Ok(true) => {
                    metrics::counter!("worker_aggregate_adjustments_total", "kind" => kind)
                        .increment(1);
                }
                Ok(false) => {
                    metrics::counter!("worker_aggregate_skipped_total").increment(1);
                    tracing::debug!(
                        %order_id,
                        worker_id = %worker,
                        kind,
                        "referenced worker does not exist, adjustment skipped"
                    );
                }
                Err(source) => {
                    metrics::counter!("worker_aggregate_failures_total").increment(1);
                    tracing::error!(
                        %order_id,
                        worker_id = %worker,
                        kind,
                        error = %source,
                        "worker aggregate update failed, recount the worker to repair"
                    );
                    return Err(DomainError::AggregateSync { order_id, source });
                }
            }
        }
        Ok(())
    }

    /// Applies one adjustment. Returns false if the worker does not exist.
    async fn apply_one(&self, adjustment: Adjustment) -> Result<bool, StoreError> {
        match adjustment {
            Adjustment::Attach { worker, number } => {
                if self.workers.adjust_total_orders(worker, 1).await?.is_none() {
                    return Ok(false);
                }
                self.workers.add_order_number(worker, &number).await?;
            }
            Adjustment::Release { worker, number } => {
                if self.workers.adjust_total_orders(worker, -1).await?.is_none() {
                    return Ok(false);
                }
                self.workers.release_order_number(worker, &number).await?;
            }
            Adjustment::Renumber { worker, from, to } => {
                if self
                    .workers
                    .release_order_number(worker, &from)
                    .await?
                    .is_none()
                {
                    return Ok(false);
                }
                self.workers.add_order_number(worker, &to).await?;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassigned_create_needs_nothing() {
        assert!(plan_adjustments(None, None).is_empty());
    }

    #[test]
    fn assigned_create_attaches() {
        let w = WorkerId::new();
        assert_eq!(
            plan_adjustments(None, Some((w, "O1"))),
            vec![Adjustment::Attach {
                worker: w,
                number: "O1".to_string()
            }]
        );
    }

    #[test]
    fn unchanged_assignment_needs_nothing() {
        let w = WorkerId::new();
        assert!(plan_adjustments(Some((w, "O1")), Some((w, "O1"))).is_empty());
    }

    #[test]
    fn reassignment_releases_then_attaches() {
        let a = WorkerId::new();
        let b = WorkerId::new();
        assert_eq!(
            plan_adjustments(Some((a, "O1")), Some((b, "O1"))),
            vec![
                Adjustment::Release {
                    worker: a,
                    number: "O1".to_string()
                },
                Adjustment::Attach {
                    worker: b,
                    number: "O1".to_string()
                },
            ]
        );
    }

    #[test]
    fn reassignment_with_new_number_uses_each_side_number() {
        let a = WorkerId::new();
        let b = WorkerId::new();
        let plan = plan_adjustments(Some((a, "O1")), Some((b, "O2")));
        assert_eq!(
            plan,
            vec![
                Adjustment::Release {
                    worker: a,
                    number: "O1".to_string()
                },
                Adjustment::Attach {
                    worker: b,
                    number: "O2".to_string()
                },
            ]
        );
    }

    #[test]
    fn unassignment_releases() {
        let a = WorkerId::new();
        assert_eq!(
            plan_adjustments(Some((a, "O1")), None),
            vec![Adjustment::Release {
                worker: a,
                number: "O1".to_string()
            }]
        );
    }

    #[test]
    fn renumber_keeps_count() {
        let a = WorkerId::new();
        assert_eq!(
            plan_adjustments(Some((a, "O1")), Some((a, "O9"))),
            vec![Adjustment::Renumber {
                worker: a,
                from: "O1".to_string(),
                to: "O9".to_string()
            }]
        );
    }
}
