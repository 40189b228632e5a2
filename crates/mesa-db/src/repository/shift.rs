//! # Shift Repository
//!
//! Shift lifecycle belongs to another part of the system; the engine only
//! asks "which shift is open for this staff member" and "has this shift
//! ended". `open`/`close` exist for seeding and tests.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use mesa_core::Shift;

/// Repository for shift database operations.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    /// Creates a new ShiftRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    /// Gets a shift by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(
            "SELECT id, staff_id, terminal_id, start_time, end_time FROM shifts WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Finds the staff member's open shift (most recent if several).
    pub async fn find_open_for_staff(&self, staff_id: &str) -> DbResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, staff_id, terminal_id, start_time, end_time
            FROM shifts
            WHERE staff_id = ?1 AND end_time IS NULL
            ORDER BY start_time DESC
            LIMIT 1
            "#,
        )
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Opens a shift.
    pub async fn open(&self, shift: &Shift) -> DbResult<()> {
        debug!(id = %shift.id, staff_id = %shift.staff_id, "Opening shift");

        sqlx::query(
            r#"
            INSERT INTO shifts (id, staff_id, terminal_id, start_time, end_time)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&shift.id)
        .bind(&shift.staff_id)
        .bind(&shift.terminal_id)
        .bind(shift.start_time)
        .bind(shift.end_time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Ends a shift. Orders it owns are frozen from then on.
    pub async fn close(&self, id: &str, end_time: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, "Closing shift");

        let result = sqlx::query("UPDATE shifts SET end_time = ?2 WHERE id = ?1")
            .bind(id)
            .bind(end_time)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shift", id));
        }

        Ok(())
    }

    /// Reads a shift inside a transaction.
    pub async fn fetch_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Shift> {
        sqlx::query_as::<_, Shift>(
            "SELECT id, staff_id, terminal_id, start_time, end_time FROM shifts WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Shift", id))
    }
}
