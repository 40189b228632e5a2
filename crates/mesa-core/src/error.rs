//! # Error Types
//!
//! Domain-specific error types for mesa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mesa-core errors (this file)                                          │
//! │  ├── CoreError        - Order lifecycle / payment rule violations      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  mesa-db errors                                                        │
//! │  └── DbError          - Database failures (wraps CoreError)            │
//! │                                                                         │
//! │  mesa-engine errors                                                    │
//! │  └── EngineError      - What callers see                               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → EngineError → caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant carries the ids and states needed to render a precise
//! message. Two outcomes are deliberately NOT errors: a duplicate gateway
//! reference and a settlement that lost the race to another one.

use thiserror::Error;

use crate::money::Money;
use crate::types::{OrderStatus, StaffRole};

// =============================================================================
// Core Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Referenced line item does not exist.
    #[error("Order item not found: {0}")]
    OrderItemNotFound(String),

    /// Referenced product does not exist in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is not currently sellable.
    #[error("Product {0} is not currently available for sale")]
    ProductInactive(String),

    /// Item mutation attempted outside pending/preparing.
    ///
    /// ## User Workflow
    /// ```text
    /// Waiter adds a beer to order #12 (status: ready)
    ///      │
    ///      ▼
    /// InvalidOrderState { order_id: "#12", status: Ready }
    ///      │
    ///      ▼
    /// UI shows: "Order is ready, open a new order instead"
    /// ```
    #[error("Order {order_id} is {status}, items can no longer be changed")]
    InvalidOrderState {
        order_id: String,
        status: OrderStatus,
    },

    /// Transition not in the order graph.
    #[error("Order {order_id} cannot move from {current} to {attempted}")]
    InvalidOrderStatusTransition {
        order_id: String,
        current: OrderStatus,
        attempted: OrderStatus,
    },

    /// Transition not in the kitchen graph.
    #[error("Kitchen cannot move order {order_id} from {current} to {attempted}")]
    InvalidKitchenStatusTransition {
        order_id: String,
        current: OrderStatus,
        attempted: OrderStatus,
    },

    /// Quantity outside `1..=MAX_ITEM_QUANTITY`.
    #[error("Invalid quantity {quantity}: must be between 1 and {}", crate::validation::MAX_ITEM_QUANTITY)]
    InvalidQuantity { quantity: i64 },

    /// A line or order total does not fit in the money type.
    #[error("Amount overflow while computing {context}")]
    AmountOverflow { context: &'static str },

    /// The shift owning the order has ended; the order is frozen.
    #[error("Shift {shift_id} for order {order_id} is already closed")]
    ShiftAlreadyClosed { order_id: String, shift_id: String },

    /// Payment attempted on an order with no live items.
    #[error("Order {0} has no items and cannot be paid")]
    OrderHasNoItems(String),

    /// Underpayment. Carries both values so the UI can show the shortfall.
    #[error("Payment of {amount} is less than order total {total}")]
    PaymentInsufficient { amount: Money, total: Money },

    /// Staff member lacks every allowed role (or is inactive/unknown).
    #[error("Staff {staff_id} is not allowed to perform this action (requires one of: {allowed:?})")]
    RoleDenied {
        staff_id: String,
        allowed: Vec<StaffRole>,
    },

    /// No open shift for the staff member creating an order.
    #[error("No active shift for staff {0}")]
    NoActiveShift(String),

    /// Dine-in orders must name a table.
    #[error("Dine-in orders require a table")]
    TableRequired,

    /// Referenced table does not exist or is occupied by another order.
    #[error("Table {0} is not available")]
    TableUnavailable(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Builds a RoleDenied error from a role slice.
    pub fn role_denied(staff_id: impl Into<String>, allowed: &[StaffRole]) -> Self {
        CoreError::RoleDenied {
            staff_id: staff_id.into(),
            allowed: allowed.to_vec(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., an unparsable URL).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::PaymentInsufficient {
            amount: Money::from_units(19_999),
            total: Money::from_units(20_000),
        };
        assert_eq!(
            err.to_string(),
            "Payment of UGX 19,999 is less than order total UGX 20,000"
        );

        let err = CoreError::InvalidKitchenStatusTransition {
            order_id: "o-1".to_string(),
            current: OrderStatus::Served,
            attempted: OrderStatus::Preparing,
        };
        assert_eq!(
            err.to_string(),
            "Kitchen cannot move order o-1 from served to preparing"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "external_reference".to_string(),
        };
        assert_eq!(err.to_string(), "external_reference is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_role_denied_helper() {
        let err = CoreError::role_denied("staff-1", &[StaffRole::Cashier, StaffRole::Admin]);
        match err {
            CoreError::RoleDenied { staff_id, allowed } => {
                assert_eq!(staff_id, "staff-1");
                assert_eq!(allowed, vec![StaffRole::Cashier, StaffRole::Admin]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
