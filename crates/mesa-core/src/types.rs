//! # Domain Types
//!
//! Core domain types used throughout Mesa POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Shift       │   │     Order       │   │    Payment      │       │
//! │  │  ─────────────  │◄──│  ─────────────  │──►│  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  end_time       │   │  status         │   │  method         │       │
//! │  └─────────────────┘   │  total          │   │  external_ref   │       │
//! │                        └────────┬────────┘   └─────────────────┘       │
//! │                                 │ owns                                  │
//! │                        ┌────────▼────────┐   ┌─────────────────┐       │
//! │                        │   OrderItem     │──►│    Product      │       │
//! │                        │  unit_price     │   │  price (live)   │       │
//! │                        │  (snapshot)     │   │  is_active      │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity id is a UUID v4 string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;

// =============================================================================
// Order Type
// =============================================================================

/// How the order is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OrderType {
    /// Seated at a table; the table is released after settlement.
    DineIn,
    /// Collected at the counter, no table involved.
    Takeaway,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// `Served` (paid) and `Cancelled` are terminal. See [`crate::status`] for the
/// allowed transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OrderStatus {
    /// Created, items being added.
    Pending,
    /// Kitchen/bar is working on it.
    Preparing,
    /// Ready to hand over.
    Ready,
    /// Settled. Terminal.
    Served,
    /// Cancelled before settlement. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
        OrderStatus::Cancelled,
    ];

    /// Wire/storage name of the status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Returns true for `Served` and `Cancelled`.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Served | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method / Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash at the till.
    Cash,
    /// MTN Mobile Money.
    MtnMomo,
    /// Airtel Money.
    AirtelMoney,
    /// Card, collected through the external gateway.
    Card,
}

impl PaymentMethod {
    /// Methods a gateway callback may settle with.
    pub const fn is_external(&self) -> bool {
        matches!(
            self,
            PaymentMethod::Card | PaymentMethod::MtnMomo | PaymentMethod::AirtelMoney
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::MtnMomo => "mtn_momo",
            PaymentMethod::AirtelMoney => "airtel_money",
            PaymentMethod::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment row status. The engine only ever writes `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentStatus {
    Completed,
}

// =============================================================================
// Staff
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StaffRole {
    Admin,
    Manager,
    Cashier,
    Waiter,
    Kitchen,
}

impl StaffRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Manager => "manager",
            StaffRole::Cashier => "cashier",
            StaffRole::Waiter => "waiter",
            StaffRole::Kitchen => "kitchen",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A staff member as seen by the role check.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Staff {
    pub id: String,
    pub name: String,
    pub role: StaffRole,
    pub is_active: bool,
}

// =============================================================================
// Shift
// =============================================================================

/// A staff member's working session. Orders belong to the shift that created them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Shift {
    pub id: String,
    pub staff_id: String,
    pub terminal_id: String,
    #[ts(as = "String")]
    pub start_time: DateTime<Utc>,
    /// `None` while the shift is open.
    #[ts(as = "Option<String>")]
    pub end_time: Option<DateTime<Utc>>,
}

impl Shift {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A menu product. Only its live price and active flag matter to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Current selling price.
    pub price: Money,
    /// Whether the product is currently sellable.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Dining Table
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TableStatus {
    Available,
    Occupied,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DiningTable {
    pub id: String,
    pub label: String,
    pub status: TableStatus,
    pub current_order_id: Option<String>,
}

// =============================================================================
// Order
// =============================================================================

/// A customer's order.
///
/// ## Invariant
/// `total == Σ item.line_total` over the live items after every mutation.
/// Prices are tax-inclusive, so `tax` is recorded as zero and
/// `total == subtotal`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub shift_id: String,
    pub table_id: Option<String>,
    pub created_by: String,
    pub updated_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses snapshot pattern to freeze product data at the time it was added.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of adding (frozen).
    pub product_name: String,
    /// Always >= 1.
    pub quantity: i64,
    /// Unit price at time of adding (frozen).
    pub unit_price: Money,
    /// unit_price × quantity.
    pub line_total: Money,
    pub size: Option<String>,
    pub modifier: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Line total recomputed from the snapshot price and current quantity.
    #[inline]
    pub fn computed_line_total(&self) -> CoreResult<Money> {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Caller input for adding a line item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i64,
    pub size: Option<String>,
    pub modifier: Option<String>,
    pub notes: Option<String>,
}

impl NewOrderItem {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        NewOrderItem {
            product_id: product_id.into(),
            quantity,
            ..Default::default()
        }
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment towards an order.
/// An order can have several payments (split tender) but settles once.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Gateway reference; globally unique when present.
    pub external_reference: Option<String>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Result of a settlement attempt that did not fail.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[ts(export)]
pub enum SettlementOutcome {
    /// A payment row was written and the order is now served.
    Settled { payment: Payment },
    /// A payment with this external reference already exists; nothing changed.
    DuplicateReference { external_reference: String },
    /// The order was no longer payable (another settlement won); nothing changed.
    AlreadySettled { order_id: String, status: OrderStatus },
}

impl SettlementOutcome {
    /// The payment written by this call, if any.
    pub fn payment(&self) -> Option<&Payment> {
        match self {
            SettlementOutcome::Settled { payment } => Some(payment),
            _ => None,
        }
    }
}

// =============================================================================
// Read Models
// =============================================================================

/// Everything a receipt needs, assembled from current rows.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
    pub total_paid: Money,
    /// What is still owed (never negative).
    pub balance_due: Money,
    /// What was paid beyond the total (never negative).
    pub change_due: Money,
}

/// One order on the kitchen screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KitchenTicket {
    pub order_id: String,
    pub order_type: OrderType,
    pub table_id: Option<String>,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub items: Vec<KitchenTicketItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KitchenTicketItem {
    pub product_name: String,
    pub quantity: i64,
    pub size: Option<String>,
    pub modifier: Option<String>,
    pub notes: Option<String>,
}

impl From<&OrderItem> for KitchenTicketItem {
    fn from(item: &OrderItem) -> Self {
        KitchenTicketItem {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            size: item.size.clone(),
            modifier: item.modifier.clone(),
            notes: item.notes.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
