//! # Payment Repository
//!
//! Payments are append-only. `external_reference` is UNIQUE: it is the
//! idempotency key for gateway-originated payments, checked by
//! [`PaymentRepository::find_by_reference_in`] inside the settling
//! transaction and backstopped by the constraint.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use mesa_core::{Money, Payment};

const PAYMENT_COLUMNS: &str = r#"
    id, order_id, amount, method, status, external_reference, created_by, created_at
"#;

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Lists all payments for an order, oldest first.
    pub async fn list_for_order(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = ?1 ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Finds a payment by its gateway reference.
    pub async fn get_by_reference(&self, reference: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE external_reference = ?1"
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Sum of all payments for an order.
    pub async fn total_paid(&self, order_id: &str) -> DbResult<Money> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM payments WHERE order_id = ?1")
                .bind(order_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(Money::from_units(total))
    }

    // =========================================================================
    // Transaction-Scoped Operations
    // =========================================================================

    /// Finds a payment by its gateway reference inside a transaction.
    pub async fn find_by_reference_in(
        conn: &mut SqliteConnection,
        reference: &str,
    ) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE external_reference = ?1"
        ))
        .bind(reference)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(payment)
    }

    /// Inserts a payment row.
    pub async fn insert_in(conn: &mut SqliteConnection, payment: &Payment) -> DbResult<()> {
        debug!(
            id = %payment.id,
            order_id = %payment.order_id,
            amount = payment.amount.units(),
            method = %payment.method,
            "Inserting payment"
        );

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, amount, method, status, external_reference, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(payment.amount)
        .bind(payment.method)
        .bind(payment.status)
        .bind(&payment.external_reference)
        .bind(&payment.created_by)
        .bind(payment.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
