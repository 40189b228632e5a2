//! # Status Transition Authority
//!
//! The order lifecycle is driven by two explicit allow-lists that share the
//! same `status` field:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ORDER GRAPH (cashier flow)                                             │
//! │                                                                         │
//! │    pending ──► preparing ──► ready ──► served                           │
//! │       │            │                     ▲                              │
//! │       └──────┬─────┘                     │ settlement only              │
//! │              ▼                                                          │
//! │          cancelled                                                      │
//! │                                                                         │
//! │  KITCHEN GRAPH (kitchen flow, subset)                                   │
//! │                                                                         │
//! │    pending   --(mark preparing)--> preparing                            │
//! │    preparing --(mark ready)------> served     ("ready" collapses)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both graphs are plain tables so they can be audited and enumerated in
//! tests. Anything not listed is rejected.

use crate::error::{CoreError, CoreResult};
use crate::types::OrderStatus;

use OrderStatus::{Cancelled, Pending, Preparing, Ready, Served};

// =============================================================================
// Tables
// =============================================================================

/// Order graph: current status → statuses it may move to.
pub const ORDER_TRANSITIONS: &[(OrderStatus, &[OrderStatus])] = &[
    (Pending, &[Preparing, Cancelled]),
    (Preparing, &[Ready, Cancelled]),
    (Ready, &[Served]),
    (Served, &[]),
    (Cancelled, &[]),
];

/// Kitchen graph: current status → (status the kitchen asks for, status stored).
pub const KITCHEN_TRANSITIONS: &[(OrderStatus, &[(OrderStatus, OrderStatus)])] = &[
    (Pending, &[(Preparing, Preparing)]),
    (Preparing, &[(Ready, Served)]),
    (Ready, &[]),
    (Served, &[]),
    (Cancelled, &[]),
];

/// Statuses from which settlement is legal.
pub const PAYABLE_STATUSES: &[OrderStatus] = &[Pending, Preparing, Ready];

/// Statuses in which line items may be added, changed or removed.
pub const EDITABLE_STATUSES: &[OrderStatus] = &[Pending, Preparing];

/// Statuses from which an order may be cancelled.
pub const CANCELLABLE_STATUSES: &[OrderStatus] = &[Pending, Preparing];

/// Statuses shown on the kitchen queue.
pub const KITCHEN_QUEUE_STATUSES: &[OrderStatus] = &[Pending, Preparing];

// =============================================================================
// Lookups
// =============================================================================

/// Allowed next statuses in the order graph.
pub fn allowed_order_transitions(current: OrderStatus) -> &'static [OrderStatus] {
    ORDER_TRANSITIONS
        .iter()
        .find(|(from, _)| *from == current)
        .map(|(_, next)| *next)
        .unwrap_or(&[])
}

/// Allowed (requested, stored) pairs in the kitchen graph.
pub fn allowed_kitchen_transitions(
    current: OrderStatus,
) -> &'static [(OrderStatus, OrderStatus)] {
    KITCHEN_TRANSITIONS
        .iter()
        .find(|(from, _)| *from == current)
        .map(|(_, next)| *next)
        .unwrap_or(&[])
}

#[inline]
pub fn is_payable(status: OrderStatus) -> bool {
    PAYABLE_STATUSES.contains(&status)
}

#[inline]
pub fn is_editable(status: OrderStatus) -> bool {
    EDITABLE_STATUSES.contains(&status)
}

#[inline]
pub fn is_cancellable(status: OrderStatus) -> bool {
    CANCELLABLE_STATUSES.contains(&status)
}

// =============================================================================
// Validators
// =============================================================================

/// Validates an order-graph transition.
///
/// Returns `InvalidOrderStatusTransition` when `attempted` is not listed for
/// `current`.
pub fn check_order_transition(
    order_id: &str,
    current: OrderStatus,
    attempted: OrderStatus,
) -> CoreResult<()> {
    if allowed_order_transitions(current).contains(&attempted) {
        Ok(())
    } else {
        Err(CoreError::InvalidOrderStatusTransition {
            order_id: order_id.to_string(),
            current,
            attempted,
        })
    }
}

/// Validates a kitchen transition and returns the status to store.
///
/// `preparing → ready` stores `served`.
pub fn resolve_kitchen_transition(
    order_id: &str,
    current: OrderStatus,
    attempted: OrderStatus,
) -> CoreResult<OrderStatus> {
    allowed_kitchen_transitions(current)
        .iter()
        .find(|(requested, _)| *requested == attempted)
        .map(|(_, stored)| *stored)
        .ok_or_else(|| CoreError::InvalidKitchenStatusTransition {
            order_id: order_id.to_string(),
            current,
            attempted,
        })
}

/// Item mutations require the order to be pending or preparing.
pub fn ensure_editable(order_id: &str, current: OrderStatus) -> CoreResult<()> {
    if is_editable(current) {
        Ok(())
    } else {
        Err(CoreError::InvalidOrderState {
            order_id: order_id.to_string(),
            status: current,
        })
    }
}

/// Settlement-session creation requires a payable order.
pub fn ensure_payable(order_id: &str, current: OrderStatus) -> CoreResult<()> {
    if is_payable(current) {
        Ok(())
    } else {
        Err(CoreError::InvalidOrderStatusTransition {
            order_id: order_id.to_string(),
            current,
            attempted: Served,
        })
    }
}

/// Cancellation is legal from pending/preparing only.
pub fn ensure_cancellable(order_id: &str, current: OrderStatus) -> CoreResult<()> {
    check_order_transition(order_id, current, Cancelled)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_status_has_a_row() {
        for status in OrderStatus::ALL {
            assert!(ORDER_TRANSITIONS.iter().any(|(from, _)| *from == status));
            assert!(KITCHEN_TRANSITIONS.iter().any(|(from, _)| *from == status));
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_exits() {
        for status in OrderStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(allowed_order_transitions(status).is_empty());
            assert!(allowed_kitchen_transitions(status).is_empty());
        }
    }

    #[test]
    fn test_kitchen_graph_enumerated() {
        // Every (current, attempted) pair; only two are accepted.
        for current in OrderStatus::ALL {
            for attempted in OrderStatus::ALL {
                let result = resolve_kitchen_transition("o-1", current, attempted);
                match (current, attempted) {
                    (Pending, Preparing) => assert_eq!(result.unwrap(), Preparing),
                    (Preparing, Ready) => assert_eq!(result.unwrap(), Served),
                    _ => assert!(
                        matches!(
                            result,
                            Err(CoreError::InvalidKitchenStatusTransition { .. })
                        ),
                        "{current} -> {attempted} should be rejected"
                    ),
                }
            }
        }
    }

    #[test]
    fn test_kitchen_error_carries_context() {
        let err = resolve_kitchen_transition("o-9", Served, Preparing).unwrap_err();
        match err {
            CoreError::InvalidKitchenStatusTransition {
                order_id,
                current,
                attempted,
            } => {
                assert_eq!(order_id, "o-9");
                assert_eq!(current, Served);
                assert_eq!(attempted, Preparing);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_kitchen_cannot_skip_preparing() {
        assert!(resolve_kitchen_transition("o", Pending, Ready).is_err());
        assert!(resolve_kitchen_transition("o", Pending, Served).is_err());
    }

    #[test]
    fn test_order_graph() {
        assert!(check_order_transition("o", Pending, Preparing).is_ok());
        assert!(check_order_transition("o", Preparing, Ready).is_ok());
        assert!(check_order_transition("o", Ready, Served).is_ok());
        assert!(check_order_transition("o", Pending, Ready).is_err());
        assert!(check_order_transition("o", Served, Cancelled).is_err());
        assert!(check_order_transition("o", Ready, Cancelled).is_err());
    }

    #[test]
    fn test_status_sets() {
        assert!(is_payable(Pending) && is_payable(Preparing) && is_payable(Ready));
        assert!(!is_payable(Served) && !is_payable(Cancelled));

        assert!(is_editable(Pending) && is_editable(Preparing));
        assert!(!is_editable(Ready));

        assert!(ensure_cancellable("o", Preparing).is_ok());
        assert!(matches!(
            ensure_cancellable("o", Served),
            Err(CoreError::InvalidOrderStatusTransition { .. })
        ));
    }

    #[test]
    fn test_ensure_editable_reports_status() {
        let err = ensure_editable("o-2", Ready).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidOrderState { status: Ready, .. }
        ));
    }
}
