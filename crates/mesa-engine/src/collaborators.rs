//! # Collaborators
//!
//! Things the engine consults but does not own. Each is a trait so a host
//! can plug in its own shift service, auth store or floor plan; the
//! `Sqlite*` types read the same database the engine writes to.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Trait             Question asked                  Failure             │
//! │  ───────────────   ─────────────────────────────   ─────────────────── │
//! │  ShiftDirectory    which shift is open for staff?  NoActiveShift       │
//! │  RoleGuard         may staff do this?              RoleDenied          │
//! │  TableRelease      free the table held by order    (logged, not raised)│
//! │  ProductCatalog    price + sellable flag           ProductNotFound     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All of these are called outside the engine's transactions.

use async_trait::async_trait;

use crate::error::EngineResult;
use mesa_core::{CoreError, Money, StaffRole};
use mesa_db::Database;

/// The open shift returned by [`ShiftDirectory::active_shift`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveShift {
    pub id: String,
    pub terminal_id: String,
}

/// Current catalog view of a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub is_active: bool,
}

// =============================================================================
// Traits
// =============================================================================

#[async_trait]
pub trait ShiftDirectory: Send + Sync {
    /// Fails with `NoActiveShift` when the staff member has no open shift.
    async fn active_shift(&self, staff_id: &str) -> EngineResult<ActiveShift>;
}

#[async_trait]
pub trait RoleGuard: Send + Sync {
    /// Fails with `RoleDenied` unless the staff member is active and holds
    /// one of `allowed`.
    async fn assert_role(&self, staff_id: &str, allowed: &[StaffRole]) -> EngineResult<()>;
}

#[async_trait]
pub trait TableRelease: Send + Sync {
    /// Frees the table held by the order. Idempotent; a no-op for orders
    /// without a table.
    async fn release_table_for_order(&self, order_id: &str) -> EngineResult<()>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fails with `ProductNotFound` for unknown ids. Inactive products are
    /// returned; the caller decides.
    async fn product(&self, product_id: &str) -> EngineResult<ProductSnapshot>;
}

// =============================================================================
// SQLite Implementations
// =============================================================================

#[derive(Debug, Clone)]
pub struct SqliteShiftDirectory {
    db: Database,
}

impl SqliteShiftDirectory {
    pub fn new(db: Database) -> Self {
        SqliteShiftDirectory { db }
    }
}

#[async_trait]
impl ShiftDirectory for SqliteShiftDirectory {
    async fn active_shift(&self, staff_id: &str) -> EngineResult<ActiveShift> {
        let shift = self
            .db
            .shifts()
            .find_open_for_staff(staff_id)
            .await?
            .ok_or_else(|| CoreError::NoActiveShift(staff_id.to_string()))?;

        Ok(ActiveShift {
            id: shift.id,
            terminal_id: shift.terminal_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SqliteRoleGuard {
    db: Database,
}

impl SqliteRoleGuard {
    pub fn new(db: Database) -> Self {
        SqliteRoleGuard { db }
    }
}

#[async_trait]
impl RoleGuard for SqliteRoleGuard {
    async fn assert_role(&self, staff_id: &str, allowed: &[StaffRole]) -> EngineResult<()> {
        match self.db.staff().get_by_id(staff_id).await? {
            Some(staff) if staff.is_active && allowed.contains(&staff.role) => Ok(()),
            // Unknown and inactive staff are denied the same way
            _ => Err(CoreError::role_denied(staff_id, allowed).into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteTableRelease {
    db: Database,
}

impl SqliteTableRelease {
    pub fn new(db: Database) -> Self {
        SqliteTableRelease { db }
    }
}

#[async_trait]
impl TableRelease for SqliteTableRelease {
    async fn release_table_for_order(&self, order_id: &str) -> EngineResult<()> {
        self.db.tables().release_for_order(order_id).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SqliteProductCatalog {
    db: Database,
}

impl SqliteProductCatalog {
    pub fn new(db: Database) -> Self {
        SqliteProductCatalog { db }
    }
}

#[async_trait]
impl ProductCatalog for SqliteProductCatalog {
    async fn product(&self, product_id: &str) -> EngineResult<ProductSnapshot> {
        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        Ok(ProductSnapshot {
            id: product.id,
            name: product.name,
            price: product.price,
            is_active: product.is_active,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
