//! # Staff Repository
//!
//! Read side of staff accounts, used by the role check.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use mesa_core::Staff;

/// Repository for staff database operations.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    /// Creates a new StaffRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    /// Gets a staff member by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(
            "SELECT id, name, role, is_active FROM staff WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(staff)
    }

    /// Inserts a staff member.
    pub async fn insert(&self, staff: &Staff) -> DbResult<()> {
        debug!(id = %staff.id, role = %staff.role, "Inserting staff");

        sqlx::query("INSERT INTO staff (id, name, role, is_active) VALUES (?1, ?2, ?3, ?4)")
            .bind(&staff.id)
            .bind(&staff.name)
            .bind(staff.role)
            .bind(staff.is_active)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
