//! # Order Service
//!
//! Entry point for every engine operation. The operations themselves are
//! spread over several files, each adding an `impl OrderService` block:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  service.rs      construction, create / status / cancel                │
//! │  ledger.rs       add / update quantity / remove item                   │
//! │  kitchen.rs      kitchen status transitions                            │
//! │  settlement.rs   pay cash / pay momo / record external payment         │
//! │  session.rs      hosted checkout session                               │
//! │  read_models.rs  order, receipt, kitchen queue                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Shape
//! Role checks, shift and product lookups run first on the pool. Then one
//! transaction: lock the order row, read, validate, write, commit. Work
//! that belongs to another aggregate (freeing a table) runs after commit.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::collaborators::{
    ProductCatalog, RoleGuard, ShiftDirectory, SqliteProductCatalog, SqliteRoleGuard,
    SqliteShiftDirectory, SqliteTableRelease, TableRelease,
};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use mesa_core::status::{check_order_transition, ensure_cancellable};
use mesa_core::{CoreError, Money, Order, OrderStatus, OrderType, StaffRole};
use mesa_db::{Database, OrderRepository, TableRepository};
use mesa_gateway::{PaymentGateway, PesapalClient};

/// Roles allowed to open orders and edit their items.
pub const ORDER_TAKING_ROLES: &[StaffRole] = &[
    StaffRole::Cashier,
    StaffRole::Waiter,
    StaffRole::Manager,
    StaffRole::Admin,
];

/// Roles allowed to take payments and cancel orders.
pub const TILL_ROLES: &[StaffRole] = &[StaffRole::Cashier, StaffRole::Manager, StaffRole::Admin];

/// Roles allowed to move orders through the kitchen.
pub const KITCHEN_ROLES: &[StaffRole] = &[StaffRole::Kitchen, StaffRole::Manager, StaffRole::Admin];

/// The order lifecycle and payment engine.
///
/// Cheap to clone; clones share the pool and collaborators.
#[derive(Clone)]
pub struct OrderService {
    pub(crate) db: Database,
    pub(crate) shifts: Arc<dyn ShiftDirectory>,
    pub(crate) roles: Arc<dyn RoleGuard>,
    pub(crate) tables: Arc<dyn TableRelease>,
    pub(crate) catalog: Arc<dyn ProductCatalog>,
    pub(crate) gateway: Option<Arc<dyn PaymentGateway>>,
}

impl OrderService {
    /// Creates a service whose collaborators all read `db`. No gateway.
    pub fn new(db: Database) -> Self {
        OrderService {
            shifts: Arc::new(SqliteShiftDirectory::new(db.clone())),
            roles: Arc::new(SqliteRoleGuard::new(db.clone())),
            tables: Arc::new(SqliteTableRelease::new(db.clone())),
            catalog: Arc::new(SqliteProductCatalog::new(db.clone())),
            gateway: None,
            db,
        }
    }

    /// Opens the database and, when configured, the gateway client.
    pub async fn from_config(config: EngineConfig) -> EngineResult<Self> {
        let db = Database::new(config.database).await?;
        let mut service = OrderService::new(db);

        if let Some(gateway) = config.gateway {
            service = service.with_gateway(Arc::new(PesapalClient::new(gateway)?));
        }

        Ok(service)
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_shift_directory(mut self, shifts: Arc<dyn ShiftDirectory>) -> Self {
        self.shifts = shifts;
        self
    }

    pub fn with_role_guard(mut self, roles: Arc<dyn RoleGuard>) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_table_release(mut self, tables: Arc<dyn TableRelease>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_product_catalog(mut self, catalog: Arc<dyn ProductCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Order Lifecycle
    // =========================================================================

    /// Opens a new order on the staff member's current shift.
    ///
    /// Dine-in orders claim their table in the same transaction. A table on
    /// a takeaway order is ignored.
    ///
    /// ## Errors
    /// `RoleDenied`, `NoActiveShift`, `TableRequired`, `TableUnavailable`
    pub async fn create_order(
        &self,
        staff_id: &str,
        order_type: OrderType,
        table_id: Option<&str>,
    ) -> EngineResult<Order> {
        self.roles.assert_role(staff_id, ORDER_TAKING_ROLES).await?;
        let shift = self.shifts.active_shift(staff_id).await?;

        let table_id = match order_type {
            OrderType::DineIn => Some(
                table_id
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .ok_or(CoreError::TableRequired)?
                    .to_string(),
            ),
            OrderType::Takeaway => None,
        };

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_type,
            status: OrderStatus::Pending,
            subtotal: Money::zero(),
            tax: Money::zero(),
            total: Money::zero(),
            shift_id: shift.id,
            table_id,
            created_by: staff_id.to_string(),
            updated_by: staff_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin().await?;
        if let Some(table_id) = &order.table_id {
            TableRepository::occupy_in(&mut tx, table_id, &order.id).await?;
        }
        OrderRepository::insert_in(&mut tx, &order).await?;
        tx.commit().await?;

        info!(
            order_id = %order.id,
            shift_id = %order.shift_id,
            order_type = ?order.order_type,
            table_id = ?order.table_id,
            "Order created"
        );

        Ok(order)
    }

    /// Moves an order forward on the service side (`pending → preparing`,
    /// `preparing → ready`).
    ///
    /// `served` belongs to settlement and `cancelled` to
    /// [`cancel_order`](Self::cancel_order); asking for either here fails.
    pub async fn update_order_status(
        &self,
        order_id: &str,
        next: OrderStatus,
        staff_id: &str,
    ) -> EngineResult<Order> {
        self.roles.assert_role(staff_id, ORDER_TAKING_ROLES).await?;

        let mut tx = self.db.begin().await?;
        OrderRepository::lock(&mut tx, order_id).await?;
        let order = OrderRepository::fetch_in(&mut tx, order_id).await?;

        if matches!(next, OrderStatus::Served | OrderStatus::Cancelled) {
            return Err(CoreError::InvalidOrderStatusTransition {
                order_id: order_id.to_string(),
                current: order.status,
                attempted: next,
            }
            .into());
        }
        check_order_transition(order_id, order.status, next)?;

        OrderRepository::write_status_in(&mut tx, order_id, next, staff_id).await?;
        let order = OrderRepository::fetch_in(&mut tx, order_id).await?;
        tx.commit().await?;

        info!(order_id = %order_id, status = %next, "Order status updated");
        Ok(order)
    }

    /// Cancels an order that has not reached the pass yet.
    ///
    /// ## Errors
    /// `InvalidOrderStatusTransition` from `ready`, `served` or `cancelled`.
    pub async fn cancel_order(&self, order_id: &str, staff_id: &str) -> EngineResult<Order> {
        self.roles.assert_role(staff_id, TILL_ROLES).await?;

        let mut tx = self.db.begin().await?;
        OrderRepository::lock(&mut tx, order_id).await?;
        let order = OrderRepository::fetch_in(&mut tx, order_id).await?;

        ensure_cancellable(order_id, order.status)?;

        OrderRepository::write_status_in(&mut tx, order_id, OrderStatus::Cancelled, staff_id)
            .await?;
        let order = OrderRepository::fetch_in(&mut tx, order_id).await?;
        tx.commit().await?;

        info!(order_id = %order_id, "Order cancelled");

        self.release_table_after_commit(&order).await;
        Ok(order)
    }

    /// Frees a dine-in order's table once its final state is committed.
    ///
    /// A failure here is logged and swallowed: the order change has already
    /// committed and must not be reported as failed.
    pub(crate) async fn release_table_after_commit(&self, order: &Order) {
        if order.order_type != OrderType::DineIn {
            return;
        }

        if let Err(err) = self.tables.release_table_for_order(&order.id).await {
            warn!(
                order_id = %order.id,
                table_id = ?order.table_id,
                error = %err,
                "Table release failed after commit"
            );
        }
    }
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("db", &self.db)
            .field("gateway", &self.gateway.is_some())
            .finish_non_exhaustive()
    }
}
