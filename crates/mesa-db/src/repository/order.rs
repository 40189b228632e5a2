//! # Order Repository
//!
//! Database operations for orders.
//!
//! ## Row Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every mutating operation on an order                                   │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE orders SET updated_at = updated_at WHERE id = ?   ← lock()   │
//! │      │   takes SQLite's writer lock before anything is read            │
//! │      │   0 rows → OrderNotFound                                        │
//! │      ▼                                                                  │
//! │    SELECT order / items / shift / payments  (now stable)               │
//! │    INSERT / UPDATE / DELETE                                            │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A concurrent writer blocks at its own lock() until COMMIT, then       │
//! │  reads the committed state and re-checks its preconditions.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Functions taking `conn: &mut SqliteConnection` run inside the caller's
//! transaction; pass `&mut *tx`.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use mesa_core::{CoreError, Order, OrderStatus, OrderTotals};

const ORDER_COLUMNS: &str = r#"
    id, order_type, status, subtotal, tax, total, shift_id, table_id,
    created_by, updated_by, created_at, updated_at
"#;

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Pool Reads
    // =========================================================================

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lists every order of a shift, oldest first.
    pub async fn list_by_shift(&self, shift_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE shift_id = ?1 ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists the shift's orders the kitchen still has to work on.
    ///
    /// `pending` and `preparing` only, oldest first (ticket order).
    /// Creation-time ties fall back to insertion order.
    pub async fn list_kitchen_queue(&self, shift_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE shift_id = ?1 AND status IN (?2, ?3)
            ORDER BY created_at ASC, rowid ASC
            "#
        ))
        .bind(shift_id)
        .bind(OrderStatus::Pending)
        .bind(OrderStatus::Preparing)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    // =========================================================================
    // Transaction-Scoped Operations
    // =========================================================================

    /// Takes the writer lock on an order row.
    ///
    /// Must be the first statement of the transaction.
    ///
    /// ## Errors
    /// `DbError::Domain(CoreError::OrderNotFound)` if the order does not exist.
    pub async fn lock(conn: &mut SqliteConnection, order_id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE orders SET updated_at = updated_at WHERE id = ?1")
            .bind(order_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::OrderNotFound(order_id.to_string()).into());
        }

        Ok(())
    }

    /// Takes the writer lock on the order owning a line item.
    ///
    /// Returns the owning order id.
    ///
    /// ## Errors
    /// `DbError::Domain(CoreError::OrderItemNotFound)` if the item does not exist.
    pub async fn lock_for_item(conn: &mut SqliteConnection, item_id: &str) -> DbResult<String> {
        let order_id: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE orders SET updated_at = updated_at
            WHERE id = (SELECT order_id FROM order_items WHERE id = ?1)
            RETURNING id
            "#,
        )
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await?;

        order_id.ok_or_else(|| CoreError::OrderItemNotFound(item_id.to_string()).into())
    }

    /// Reads a locked order.
    pub async fn fetch_in(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Order> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()).into())
    }

    /// Inserts a new order.
    pub async fn insert_in(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, shift_id = %order.shift_id, order_type = ?order.order_type, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_type, status, subtotal, tax, total, shift_id, table_id,
                created_by, updated_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&order.id)
        .bind(order.order_type)
        .bind(order.status)
        .bind(order.subtotal)
        .bind(order.tax)
        .bind(order.total)
        .bind(&order.shift_id)
        .bind(&order.table_id)
        .bind(&order.created_by)
        .bind(&order.updated_by)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Overwrites the stored totals with freshly derived ones.
    pub async fn write_totals_in(
        conn: &mut SqliteConnection,
        order_id: &str,
        totals: &OrderTotals,
        staff_id: &str,
    ) -> DbResult<()> {
        debug!(order_id = %order_id, total = totals.total.units(), "Writing order totals");

        sqlx::query(
            r#"
            UPDATE orders
            SET subtotal = ?2, tax = ?3, total = ?4, updated_by = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .bind(totals.subtotal)
        .bind(totals.tax)
        .bind(totals.total)
        .bind(staff_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Sets the order status.
    ///
    /// Performs no transition check; callers validate against the
    /// transition tables first.
    pub async fn write_status_in(
        conn: &mut SqliteConnection,
        order_id: &str,
        status: OrderStatus,
        staff_id: &str,
    ) -> DbResult<()> {
        debug!(order_id = %order_id, status = %status, "Writing order status");

        let result = sqlx::query(
            "UPDATE orders SET status = ?2, updated_by = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(order_id)
        .bind(status)
        .bind(staff_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use mesa_core::{Money, OrderType, Shift, Staff, StaffRole};

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.staff()
            .insert(&Staff {
                id: "cashier".into(),
                name: "Amina".into(),
                role: StaffRole::Cashier,
                is_active: true,
            })
            .await
            .unwrap();
        db.shifts()
            .open(&Shift {
                id: "shift-1".into(),
                staff_id: "cashier".into(),
                terminal_id: "till-1".into(),
                start_time: Utc::now(),
                end_time: None,
            })
            .await
            .unwrap();
        (db, "shift-1".to_string())
    }

    fn order(id: &str, shift_id: &str, status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: id.into(),
            order_type: OrderType::Takeaway,
            status,
            subtotal: Money::zero(),
            tax: Money::zero(),
            total: Money::zero(),
            shift_id: shift_id.into(),
            table_id: None,
            created_by: "cashier".into(),
            updated_by: "cashier".into(),
            created_at: now,
            updated_at: now,
        }
    }

    async fn insert(db: &Database, order: &Order) {
        let mut tx = db.begin().await.unwrap();
        OrderRepository::insert_in(&mut tx, order).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_lock_missing_order_is_not_found() {
        let (db, _) = setup().await;
        let mut tx = db.begin().await.unwrap();

        let err = OrderRepository::lock(&mut tx, "nope").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::OrderNotFound(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn test_lock_for_missing_item_is_item_not_found() {
        let (db, _) = setup().await;
        let mut tx = db.begin().await.unwrap();

        let err = OrderRepository::lock_for_item(&mut tx, "ghost").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::OrderItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_totals_and_status_round_trip() {
        let (db, shift) = setup().await;
        insert(&db, &order("o-1", &shift, OrderStatus::Pending)).await;

        let totals = OrderTotals {
            subtotal: Money::from_units(50_000),
            tax: Money::zero(),
            total: Money::from_units(50_000),
        };

        let mut tx = db.begin().await.unwrap();
        OrderRepository::lock(&mut tx, "o-1").await.unwrap();
        OrderRepository::write_totals_in(&mut tx, "o-1", &totals, "cashier")
            .await
            .unwrap();
        OrderRepository::write_status_in(&mut tx, "o-1", OrderStatus::Preparing, "cashier")
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let stored = db.orders().get_by_id("o-1").await.unwrap().unwrap();
        assert_eq!(stored.total, Money::from_units(50_000));
        assert_eq!(stored.status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_kitchen_queue_filters_and_orders_oldest_first() {
        let (db, shift) = setup().await;
        insert(&db, &order("first", &shift, OrderStatus::Preparing)).await;
        insert(&db, &order("done", &shift, OrderStatus::Served)).await;
        insert(&db, &order("second", &shift, OrderStatus::Pending)).await;
        insert(&db, &order("ready", &shift, OrderStatus::Ready)).await;

        let queue = db.orders().list_kitchen_queue(&shift).await.unwrap();
        let ids: Vec<_> = queue.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);

        assert_eq!(db.orders().list_by_shift(&shift).await.unwrap().len(), 4);
    }
}
