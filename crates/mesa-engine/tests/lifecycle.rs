//! Order creation, the item ledger, status changes and cancellation.

mod common;

use common::*;
use mesa_core::{
    CoreError, Money, NewOrderItem, OrderStatus, OrderType, SettlementOutcome, TableStatus,
};
use mesa_engine::EngineError;

fn domain(err: EngineError) -> CoreError {
    match err {
        EngineError::Domain(core) => core,
        other => panic!("expected a domain error, got {other:?}"),
    }
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_takeaway_order() {
    let fx = Fixture::new().await;

    let order = fx
        .engine
        .create_order(CASHIER, OrderType::Takeaway, Some(TABLE))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.shift_id, SHIFT);
    assert!(order.total.is_zero());
    assert!(order.table_id.is_none(), "takeaway ignores the table");
    assert_eq!(fx.table().await.status, TableStatus::Available);

    let stored = fx.engine.get_order(&order.id).await.unwrap();
    assert_eq!(stored.created_by, CASHIER);
}

#[tokio::test]
async fn test_create_dine_in_claims_table() {
    let fx = Fixture::new().await;

    let order = fx
        .engine
        .create_order(WAITER, OrderType::DineIn, Some(TABLE))
        .await
        .unwrap();
    assert_eq!(order.table_id.as_deref(), Some(TABLE));
    assert_eq!(order.shift_id, "shift-waiter");

    let table = fx.table().await;
    assert_eq!(table.status, TableStatus::Occupied);
    assert_eq!(table.current_order_id.as_deref(), Some(order.id.as_str()));

    let err = fx
        .engine
        .create_order(CASHIER, OrderType::DineIn, Some(TABLE))
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::TableUnavailable(_)));

    let err = fx
        .engine
        .create_order(CASHIER, OrderType::DineIn, Some("  "))
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::TableRequired));
}

#[tokio::test]
async fn test_create_order_checks_role_then_shift() {
    let fx = Fixture::new().await;

    for staff in [KITCHEN, RETIRED, "nobody"] {
        let err = fx
            .engine
            .create_order(staff, OrderType::Takeaway, None)
            .await
            .unwrap_err();
        assert!(
            matches!(domain(err), CoreError::RoleDenied { .. }),
            "{staff} should be denied"
        );
    }

    let err = fx
        .engine
        .create_order(MANAGER, OrderType::Takeaway, None)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::NoActiveShift(_)));
}

// =============================================================================
// Ledger
// =============================================================================

#[tokio::test]
async fn test_totals_follow_items() {
    let fx = Fixture::new().await;
    let order = fx.takeaway().await;

    let chicken = fx
        .engine
        .add_item(&order.id, NewOrderItem::new(CHICKEN, 1), CASHIER)
        .await
        .unwrap();
    assert_eq!(chicken.item.product_name, "Chicken Platter");
    assert_eq!(chicken.item.unit_price, CHICKEN_PRICE);
    assert_eq!(chicken.order.total, CHICKEN_PRICE);

    let juice = fx
        .engine
        .add_item(&order.id, NewOrderItem::new(JUICE, 1), WAITER)
        .await
        .unwrap();
    assert_eq!(juice.order.total, Money::from_units(50_000));
    assert_eq!(juice.order.subtotal, juice.order.total);
    assert!(juice.order.tax.is_zero());
    assert_eq!(juice.order.updated_by, WAITER);

    let changed = fx
        .engine
        .update_item_quantity(&juice.item.id, 3, CASHIER)
        .await
        .unwrap();
    assert_eq!(changed.item.quantity, 3);
    assert_eq!(changed.item.line_total, Money::from_units(60_000));
    assert_eq!(changed.order.total, Money::from_units(90_000));

    let order = fx
        .engine
        .remove_item(&chicken.item.id, CASHIER)
        .await
        .unwrap();
    assert_eq!(order.total, Money::from_units(60_000));

    let order = fx.engine.remove_item(&juice.item.id, CASHIER).await.unwrap();
    assert!(order.total.is_zero());
    assert_eq!(order.status, OrderStatus::Pending, "empty order stays open");
}

#[tokio::test]
async fn test_add_remove_then_pay_remaining_item() {
    let fx = Fixture::new().await;
    let order = fx.takeaway().await;

    let chicken = fx
        .engine
        .add_item(&order.id, NewOrderItem::new(CHICKEN, 1), CASHIER)
        .await
        .unwrap();
    let order_after_juice = fx.add(&order.id, JUICE, 1).await;
    assert_eq!(order_after_juice.total, Money::from_units(50_000));

    let order = fx
        .engine
        .remove_item(&chicken.item.id, CASHIER)
        .await
        .unwrap();
    assert_eq!(order.total, JUICE_PRICE);

    let outcome = fx
        .engine
        .pay_order_cash(&order.id, JUICE_PRICE, CASHIER)
        .await
        .unwrap();
    let payment = outcome.payment().expect("payment written");
    assert_eq!(payment.amount, JUICE_PRICE);

    let order = fx.engine.get_order(&order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Served);
}

#[tokio::test]
async fn test_item_snapshot_survives_price_change() {
    let fx = Fixture::new().await;
    let order = fx.takeaway().await;

    let change = fx
        .engine
        .add_item(&order.id, NewOrderItem::new(CHICKEN, 1), CASHIER)
        .await
        .unwrap();

    fx.db
        .products()
        .update_price(CHICKEN, Money::from_units(35_000))
        .await
        .unwrap();

    let changed = fx
        .engine
        .update_item_quantity(&change.item.id, 2, CASHIER)
        .await
        .unwrap();
    assert_eq!(changed.item.unit_price, CHICKEN_PRICE);
    assert_eq!(changed.order.total, Money::from_units(60_000));

    let added = fx
        .engine
        .add_item(&order.id, NewOrderItem::new(CHICKEN, 1), CASHIER)
        .await
        .unwrap();
    assert_eq!(added.item.unit_price, Money::from_units(35_000));
    assert_eq!(added.order.total, Money::from_units(95_000));
}

#[tokio::test]
async fn test_add_item_normalizes_free_text() {
    let fx = Fixture::new().await;
    let order = fx.takeaway().await;

    let change = fx
        .engine
        .add_item(
            &order.id,
            NewOrderItem {
                size: Some("  large ".to_string()),
                modifier: Some("   ".to_string()),
                notes: Some("no onions".to_string()),
                ..NewOrderItem::new(JUICE, 1)
            },
            CASHIER,
        )
        .await
        .unwrap();

    assert_eq!(change.item.size.as_deref(), Some("large"));
    assert_eq!(change.item.modifier, None);
    assert_eq!(change.item.notes.as_deref(), Some("no onions"));
}

#[tokio::test]
async fn test_item_errors() {
    let fx = Fixture::new().await;
    let order = fx.takeaway().await;

    let err = fx
        .engine
        .add_item(&order.id, NewOrderItem::new(CHICKEN, 0), CASHIER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::InvalidQuantity { quantity: 0 }));

    let err = fx
        .engine
        .add_item(&order.id, NewOrderItem::new("prod-missing", 1), CASHIER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::ProductNotFound(_)));

    let err = fx
        .engine
        .add_item(&order.id, NewOrderItem::new(SEASONAL, 1), CASHIER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::ProductInactive(_)));

    let err = fx
        .engine
        .add_item("order-missing", NewOrderItem::new(CHICKEN, 1), CASHIER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::OrderNotFound(_)));

    let err = fx
        .engine
        .update_item_quantity("item-missing", 2, CASHIER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::OrderItemNotFound(_)));

    let err = fx
        .engine
        .remove_item("item-missing", CASHIER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::OrderItemNotFound(_)));

    let change = fx
        .engine
        .add_item(&order.id, NewOrderItem::new(CHICKEN, 1), CASHIER)
        .await
        .unwrap();
    let err = fx
        .engine
        .update_item_quantity(&change.item.id, -1, CASHIER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::InvalidQuantity { quantity: -1 }));

    // Nothing above touched the total
    let order = fx.engine.get_order(&order.id).await.unwrap();
    assert_eq!(order.total, CHICKEN_PRICE);
}

#[tokio::test]
async fn test_quantity_ceiling() {
    let fx = Fixture::new().await;
    let order = fx.takeaway().await;

    for quantity in [1_000, i64::MAX / 1_000, i64::MAX] {
        let err = fx
            .engine
            .add_item(&order.id, NewOrderItem::new(CHICKEN, quantity), CASHIER)
            .await
            .unwrap_err();
        assert!(
            matches!(domain(err), CoreError::InvalidQuantity { quantity: q } if q == quantity),
            "quantity {quantity} should be rejected"
        );
    }

    let change = fx
        .engine
        .add_item(&order.id, NewOrderItem::new(CHICKEN, 999), CASHIER)
        .await
        .unwrap();
    let full = Money::from_units(30_000 * 999);
    assert_eq!(change.item.line_total, full);
    assert_eq!(change.order.total, full);

    for quantity in [1_000, i64::MAX / 1_000] {
        let err = fx
            .engine
            .update_item_quantity(&change.item.id, quantity, CASHIER)
            .await
            .unwrap_err();
        assert!(matches!(domain(err), CoreError::InvalidQuantity { .. }));
    }

    let item = fx.db.items().get_by_id(&change.item.id).await.unwrap().unwrap();
    assert_eq!(item.quantity, 999);
    let order = fx.engine.get_order(&order.id).await.unwrap();
    assert_eq!(order.total, full);
}

#[tokio::test]
async fn test_items_frozen_once_ready() {
    let fx = Fixture::new().await;
    let order = fx.takeaway().await;
    let change = fx
        .engine
        .add_item(&order.id, NewOrderItem::new(CHICKEN, 1), CASHIER)
        .await
        .unwrap();

    fx.engine
        .update_order_status(&order.id, OrderStatus::Preparing, CASHIER)
        .await
        .unwrap();
    // Still editable while preparing
    fx.add(&order.id, JUICE, 1).await;

    fx.engine
        .update_order_status(&order.id, OrderStatus::Ready, CASHIER)
        .await
        .unwrap();

    // State is checked before the product
    let err = fx
        .engine
        .add_item(&order.id, NewOrderItem::new("prod-missing", 0), CASHIER)
        .await
        .unwrap_err();
    assert!(matches!(
        domain(err),
        CoreError::InvalidOrderState {
            status: OrderStatus::Ready,
            ..
        }
    ));

    let err = fx
        .engine
        .update_item_quantity(&change.item.id, 0, CASHIER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::InvalidOrderState { .. }));

    let err = fx
        .engine
        .remove_item(&change.item.id, CASHIER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::InvalidOrderState { .. }));

    let order = fx.engine.get_order(&order.id).await.unwrap();
    assert_eq!(order.total, Money::from_units(50_000));
}

// =============================================================================
// Status & Cancel
// =============================================================================

#[tokio::test]
async fn test_update_order_status_walks_forward_only() {
    let fx = Fixture::new().await;
    let order = fx.takeaway_with_items().await;

    for attempted in [OrderStatus::Ready, OrderStatus::Served, OrderStatus::Cancelled] {
        let err = fx
            .engine
            .update_order_status(&order.id, attempted, CASHIER)
            .await
            .unwrap_err();
        assert!(
            matches!(domain(err), CoreError::InvalidOrderStatusTransition { .. }),
            "pending -> {attempted} should fail"
        );
    }

    let order = fx
        .engine
        .update_order_status(&order.id, OrderStatus::Preparing, WAITER)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Preparing);

    let order = fx
        .engine
        .update_order_status(&order.id, OrderStatus::Ready, WAITER)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Ready);

    let err = fx
        .engine
        .update_order_status(&order.id, OrderStatus::Preparing, WAITER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::InvalidOrderStatusTransition { .. }));

    let err = fx
        .engine
        .update_order_status("order-missing", OrderStatus::Preparing, WAITER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::OrderNotFound(_)));
}

#[tokio::test]
async fn test_cancel_order() {
    let fx = Fixture::new().await;
    let order = fx
        .engine
        .create_order(CASHIER, OrderType::DineIn, Some(TABLE))
        .await
        .unwrap();
    fx.add(&order.id, CHICKEN, 1).await;

    let err = fx
        .engine
        .cancel_order(&order.id, WAITER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::RoleDenied { .. }));

    let cancelled = fx.engine.cancel_order(&order.id, CASHIER).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(fx.table().await.status, TableStatus::Available);

    let err = fx
        .engine
        .cancel_order(&order.id, CASHIER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::InvalidOrderStatusTransition { .. }));

    let err = fx
        .engine
        .add_item(&order.id, NewOrderItem::new(JUICE, 1), CASHIER)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), CoreError::InvalidOrderState { .. }));

    // A cancelled order is not payable and takes no payment
    let outcome = fx
        .engine
        .pay_order_cash(&order.id, CHICKEN_PRICE, CASHIER)
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        SettlementOutcome::AlreadySettled {
            status: OrderStatus::Cancelled,
            ..
        }
    ));
    let receipt = fx.engine.get_order_receipt(&order.id).await.unwrap();
    assert!(receipt.payments.is_empty());
}

#[tokio::test]
async fn test_ready_order_cannot_be_cancelled() {
    let fx = Fixture::new().await;
    let order = fx.takeaway_with_items().await;
    for next in [OrderStatus::Preparing, OrderStatus::Ready] {
        fx.engine
            .update_order_status(&order.id, next, CASHIER)
            .await
            .unwrap();
    }

    let err = fx
        .engine
        .cancel_order(&order.id, MANAGER)
        .await
        .unwrap_err();
    assert!(matches!(
        domain(err),
        CoreError::InvalidOrderStatusTransition {
            current: OrderStatus::Ready,
            attempted: OrderStatus::Cancelled,
            ..
        }
    ));
}
