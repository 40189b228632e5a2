//! # Order Item Repository
//!
//! Line items owned by an order. Items are deleted with their order and
//! never exist on their own.
//!
//! ## Snapshot Pattern
//! `product_name` and `unit_price` are copied from the product when the
//! item is added. Later catalog changes never touch existing items.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use mesa_core::{CoreError, Money, OrderItem};

const ITEM_COLUMNS: &str = r#"
    id, order_id, product_id, product_name, quantity, unit_price, line_total,
    size, modifier, notes, created_at
"#;

/// Repository for order item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Gets a line item by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<OrderItem>> {
        let item = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists an order's live items in the order they were added.
    pub async fn list_for_order(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // =========================================================================
    // Transaction-Scoped Operations
    // =========================================================================

    /// Lists an order's live items inside a transaction.
    pub async fn list_in(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    /// Loads one line item inside a transaction.
    pub async fn fetch_in(conn: &mut SqliteConnection, item_id: &str) -> DbResult<OrderItem> {
        sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE id = ?1"
        ))
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| CoreError::OrderItemNotFound(item_id.to_string()).into())
    }

    /// Inserts a line item.
    pub async fn insert_in(conn: &mut SqliteConnection, item: &OrderItem) -> DbResult<()> {
        debug!(
            order_id = %item.order_id,
            product_id = %item.product_id,
            quantity = item.quantity,
            "Inserting order item"
        );

        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, product_id, product_name, quantity, unit_price,
                line_total, size, modifier, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.line_total)
        .bind(&item.size)
        .bind(&item.modifier)
        .bind(&item.notes)
        .bind(item.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Changes a line item's quantity. The unit price is left untouched.
    pub async fn update_quantity_in(
        conn: &mut SqliteConnection,
        item_id: &str,
        quantity: i64,
        line_total: Money,
    ) -> DbResult<()> {
        debug!(item_id = %item_id, quantity, "Updating order item quantity");

        let result =
            sqlx::query("UPDATE order_items SET quantity = ?2, line_total = ?3 WHERE id = ?1")
                .bind(item_id)
                .bind(quantity)
                .bind(line_total)
                .execute(&mut *conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("OrderItem", item_id));
        }

        Ok(())
    }

    /// Deletes a line item.
    pub async fn delete_in(conn: &mut SqliteConnection, item_id: &str) -> DbResult<()> {
        debug!(item_id = %item_id, "Deleting order item");

        let result = sqlx::query("DELETE FROM order_items WHERE id = ?1")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("OrderItem", item_id));
        }

        Ok(())
    }
}
