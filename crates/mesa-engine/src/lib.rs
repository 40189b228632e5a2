//! # mesa-engine: Order Lifecycle & Payment Finalization
//!
//! The operations a POS screen, kitchen display or gateway callback calls.
//! Everything goes through [`OrderService`].
//!
//! ## Order Lifecycle
//! ```text
//!                 ┌───────────── cancel ─────────────┐
//!                 │                                   ▼
//!   create ──► pending ──► preparing ──► ready    cancelled
//!                 │            │           │
//!                 └────────────┴───────────┴── settle ──► served
//! ```
//!
//! Items can change while `pending` or `preparing`. Any payable order
//! (`pending`, `preparing`, `ready`) settles in one step: a completed
//! payment row is written and the order becomes `served` in the same
//! transaction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mesa_core::{Money, NewOrderItem, OrderType};
//! use mesa_db::{Database, DbConfig};
//! use mesa_engine::OrderService;
//!
//! let db = Database::new(DbConfig::new("mesa.db")).await?;
//! let engine = OrderService::new(db);
//!
//! let order = engine.create_order("staff-1", OrderType::Takeaway, None).await?;
//! engine.add_item(&order.id, NewOrderItem::new("rolex", 2), "staff-1").await?;
//! engine.pay_order_cash(&order.id, Money::from_units(10_000), "staff-1").await?;
//! ```

pub mod collaborators;
pub mod config;
pub mod error;
pub mod kitchen;
pub mod ledger;
pub mod read_models;
pub mod service;
pub mod session;
pub mod settlement;

pub use collaborators::{
    ActiveShift, ProductCatalog, ProductSnapshot, RoleGuard, ShiftDirectory,
    SqliteProductCatalog, SqliteRoleGuard, SqliteShiftDirectory, SqliteTableRelease,
    TableRelease,
};
pub use config::{ConfigError, EngineConfig};
pub use error::{EngineError, EngineResult};
pub use ledger::ItemChange;
pub use service::{OrderService, KITCHEN_ROLES, ORDER_TAKING_ROLES, TILL_ROLES};
pub use session::PaymentSession;
