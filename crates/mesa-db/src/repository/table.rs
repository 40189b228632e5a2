//! # Dining Table Repository
//!
//! ## Occupancy
//! ```text
//!   available ──occupy_in(order)──► occupied(current_order_id = order)
//!       ▲                                   │
//!       └──────release_for_order(order)─────┘
//! ```
//!
//! A table is claimed inside the order-creation transaction and released
//! after a settlement or cancellation has committed. Release is keyed by
//! order id, so calling it twice, or for a takeaway order, changes nothing.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use mesa_core::{CoreError, DiningTable, TableStatus};

/// Repository for dining table database operations.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Gets a table by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<DiningTable>> {
        let table = sqlx::query_as::<_, DiningTable>(
            "SELECT id, label, status, current_order_id FROM dining_tables WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    /// Inserts a table.
    pub async fn insert(&self, table: &DiningTable) -> DbResult<()> {
        debug!(id = %table.id, label = %table.label, "Inserting dining table");

        sqlx::query(
            r#"
            INSERT INTO dining_tables (id, label, status, current_order_id)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&table.id)
        .bind(&table.label)
        .bind(table.status)
        .bind(&table.current_order_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Frees whatever table the order holds.
    ///
    /// Returns the number of tables released (0 or 1).
    pub async fn release_for_order(&self, order_id: &str) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE dining_tables
            SET status = ?2, current_order_id = NULL
            WHERE current_order_id = ?1
            "#,
        )
        .bind(order_id)
        .bind(TableStatus::Available)
        .execute(&self.pool)
        .await?;

        debug!(order_id = %order_id, released = result.rows_affected(), "Released table");

        Ok(result.rows_affected())
    }

    /// Claims an available table for an order.
    ///
    /// ## Errors
    /// `DbError::Domain(CoreError::TableUnavailable)` if the table does not
    /// exist or is already occupied.
    pub async fn occupy_in(
        conn: &mut SqliteConnection,
        table_id: &str,
        order_id: &str,
    ) -> DbResult<()> {
        debug!(table_id = %table_id, order_id = %order_id, "Occupying table");

        let result = sqlx::query(
            r#"
            UPDATE dining_tables
            SET status = ?3, current_order_id = ?2
            WHERE id = ?1 AND status = ?4
            "#,
        )
        .bind(table_id)
        .bind(order_id)
        .bind(TableStatus::Occupied)
        .bind(TableStatus::Available)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::TableUnavailable(table_id.to_string()).into());
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
