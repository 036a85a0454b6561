use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    LineItem, NewOrder, NewWorker, Order, OrderId, OrderPatch, OrderQuery, OrderUpdate, Result,
    Worker, WorkerId, WorkerPatch, store::DocumentStore,
};

const ORDER_COLUMNS: &str = "id, number, address, items, price, status, worker_id";
const WORKER_COLUMNS: &str = "id, first_name, last_name, middle_name, orders, total_orders";

/// PostgreSQL-backed document store implementation.
///
/// Aggregate primitives are single `UPDATE` statements whose new value is
/// computed from the row's current value, so concurrent callers never lose
/// each other's writes.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let items: Json<Vec<LineItem>> = row.try_get("items")?;
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            number: row.try_get("number")?,
            address: row.try_get("address")?,
            items: items.0,
            price: row.try_get("price")?,
            status: row.try_get("status")?,
            worker: row
                .try_get::<Option<Uuid>, _>("worker_id")?
                .map(WorkerId::from_uuid),
        })
    }

    fn row_to_worker(row: PgRow) -> Result<Worker> {
        Ok(Worker {
            id: WorkerId::from_uuid(row.try_get::<Uuid, _>("id")?),
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            middle_name: row.try_get("middle_name")?,
            orders: row.try_get("orders")?,
            total_orders: row.try_get("total_orders")?,
        })
    }

    async fn update_worker_returning(
        &self,
        sql: &str,
        id: WorkerId,
        bind: WorkerBind<'_>,
    ) -> Result<Option<Worker>> {
        let query = sqlx::query(sql).bind(id.as_uuid());
        let query = match bind {
            WorkerBind::Delta(delta) => query.bind(delta),
            WorkerBind::Number(number) => query.bind(number),
        };
        query
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_worker)
            .transpose()
    }
}

enum WorkerBind<'a> {
    Delta(i64),
    Number(&'a str),
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (id, number, address, items, price, status, worker_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(OrderId::new().as_uuid())
        .bind(&order.number)
        .bind(&order.address)
        .bind(Json(&order.items))
        .bind(order.price)
        .bind(&order.status)
        .bind(order.worker.map(|w| w.as_uuid()))
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_order(row)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_order)
            .transpose()
    }

    async fn list_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE ($1::uuid IS NULL OR worker_id = $1)
              AND ($2::text IS NULL OR number = $2)
            ORDER BY seq ASC
            "#
        ))
        .bind(query.worker.map(|w| w.as_uuid()))
        .bind(query.number)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn count_orders(&self, query: OrderQuery) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM orders
            WHERE ($1::uuid IS NULL OR worker_id = $1)
              AND ($2::text IS NULL OR number = $2)
            "#,
        )
        .bind(query.worker.map(|w| w.as_uuid()))
        .bind(query.number)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<Option<OrderUpdate>> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so the captured previous state is the one being replaced
        let Some(previous) = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };
        let previous = Self::row_to_order(previous)?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE orders SET
                number = COALESCE($2, number),
                address = COALESCE($3, address),
                items = COALESCE($4, items),
                price = COALESCE($5, price),
                status = COALESCE($6, status),
                worker_id = CASE WHEN $7 THEN $8 ELSE worker_id END
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(patch.number)
        .bind(patch.address)
        .bind(patch.items.map(Json))
        .bind(patch.price)
        .bind(patch.status)
        .bind(patch.worker.is_some())
        .bind(patch.worker.flatten().map(|w| w.as_uuid()))
        .fetch_one(&mut *tx)
        .await?;
        let current = Self::row_to_order(row)?;

        tx.commit().await?;
        Ok(Some(OrderUpdate { previous, current }))
    }

    async fn delete_order(&self, id: OrderId) -> Result<Option<Order>> {
        sqlx::query(&format!(
            "DELETE FROM orders WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .map(Self::row_to_order)
        .transpose()
    }

    async fn insert_worker(&self, worker: NewWorker) -> Result<Worker> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO workers (id, first_name, last_name, middle_name)
            VALUES ($1, $2, $3, $4)
            RETURNING {WORKER_COLUMNS}
            "#
        ))
        .bind(WorkerId::new().as_uuid())
        .bind(&worker.first_name)
        .bind(&worker.last_name)
        .bind(&worker.middle_name)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_worker(row)
    }

    async fn get_worker(&self, id: WorkerId) -> Result<Option<Worker>> {
        sqlx::query(&format!("SELECT {WORKER_COLUMNS} FROM workers WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_worker)
            .transpose()
    }

    async fn list_workers(&self) -> Result<Vec<Worker>> {
        let rows = sqlx::query(&format!(
            "SELECT {WORKER_COLUMNS} FROM workers ORDER BY seq ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_worker).collect()
    }

    async fn update_worker(&self, id: WorkerId, patch: WorkerPatch) -> Result<Option<Worker>> {
        sqlx::query(&format!(
            r#"
            UPDATE workers SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                middle_name = CASE WHEN $4 THEN $5 ELSE middle_name END,
                orders = COALESCE($6, orders),
                total_orders = COALESCE($7, total_orders)
            WHERE id = $1
            RETURNING {WORKER_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.middle_name.is_some())
        .bind(patch.middle_name.flatten())
        .bind(patch.orders)
        .bind(patch.total_orders)
        .fetch_optional(&self.pool)
        .await?
        .map(Self::row_to_worker)
        .transpose()
    }

    async fn delete_worker(&self, id: WorkerId) -> Result<Option<Worker>> {
        sqlx::query(&format!(
            "DELETE FROM workers WHERE id = $1 RETURNING {WORKER_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .map(Self::row_to_worker)
        .transpose()
    }

    async fn increment_total_orders(&self, id: WorkerId, delta: i64) -> Result<Option<Worker>> {
        let sql = format!(
            r#"
            UPDATE workers SET total_orders = total_orders + $2
            WHERE id = $1
            RETURNING {WORKER_COLUMNS}
            "#
        );
        self.update_worker_returning(&sql, id, WorkerBind::Delta(delta)).await
    }

    async fn add_order_number(&self, id: WorkerId, number: &str) -> Result<Option<Worker>> {
        let sql = format!(
            r#"
            UPDATE workers SET orders = CASE
                WHEN $2 = ANY(orders) THEN orders
                ELSE array_append(orders, $2)
            END
            WHERE id = $1
            RETURNING {WORKER_COLUMNS}
            "#
        );
        self.update_worker_returning(&sql, id, WorkerBind::Number(number)).await
    }

    async fn remove_order_number(&self, id: WorkerId, number: &str) -> Result<Option<Worker>> {
        let sql = format!(
            r#"
            UPDATE workers SET orders = CASE
                WHEN EXISTS (SELECT 1 FROM orders o WHERE o.worker_id = $1 AND o.number = $2)
                    THEN orders
                ELSE array_remove(orders, $2)
            END
            WHERE id = $1
            RETURNING {WORKER_COLUMNS}
            "#
        );
        self.update_worker_returning(&sql, id, WorkerBind::Number(number)).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        tracing::info!("closing database connection pool");
        self.pool.close().await;
    }
}
