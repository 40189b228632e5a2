//! # Order Item Ledger
//!
//! Every item mutation ends by re-summing the order from its live rows:
//!
//! ```text
//! lock order ─► gate (pending|preparing) ─► write item ─► list items
//!                                                             │
//!            commit ◄── write subtotal/tax/total ◄── Σ price × qty
//! ```
//!
//! Totals are never adjusted by a delta.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::service::{OrderService, ORDER_TAKING_ROLES};
use mesa_core::status::ensure_editable;
use mesa_core::validation::{normalize_free_text, validate_quantity};
use mesa_core::{CoreError, NewOrderItem, Order, OrderItem, OrderTotals};
use mesa_db::{ItemRepository, OrderRepository};

/// An item write together with the order's re-derived totals.
#[derive(Debug, Clone)]
pub struct ItemChange {
    pub order: Order,
    pub item: OrderItem,
}

impl OrderService {
    /// Adds a line item, snapshotting the product's current name and price.
    ///
    /// ## Errors
    /// In check order: `RoleDenied`, `OrderNotFound`, `InvalidOrderState`,
    /// `ProductNotFound` / `ProductInactive`, `InvalidQuantity`.
    pub async fn add_item(
        &self,
        order_id: &str,
        new_item: NewOrderItem,
        staff_id: &str,
    ) -> EngineResult<ItemChange> {
        self.roles.assert_role(staff_id, ORDER_TAKING_ROLES).await?;

        let size = normalize_free_text("size", new_item.size.as_deref())?;
        let modifier = normalize_free_text("modifier", new_item.modifier.as_deref())?;
        let notes = normalize_free_text("notes", new_item.notes.as_deref())?;

        // Looked up before the transaction, judged after the order checks
        let product = self.catalog.product(&new_item.product_id).await;

        let mut tx = self.db.begin().await?;
        OrderRepository::lock(&mut tx, order_id).await?;
        let order = OrderRepository::fetch_in(&mut tx, order_id).await?;
        ensure_editable(order_id, order.status)?;

        let product = product?;
        if !product.is_active {
            return Err(CoreError::ProductInactive(product.id).into());
        }
        validate_quantity(new_item.quantity)?;

        let item = OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            product_id: product.id,
            product_name: product.name,
            quantity: new_item.quantity,
            unit_price: product.price,
            line_total: product.price.multiply_quantity(new_item.quantity)?,
            size,
            modifier,
            notes,
            created_at: Utc::now(),
        };

        ItemRepository::insert_in(&mut tx, &item).await?;
        let totals = recompute_totals(&mut tx, order_id, staff_id).await?;
        let order = OrderRepository::fetch_in(&mut tx, order_id).await?;
        tx.commit().await?;

        info!(
            order_id = %order_id,
            item_id = %item.id,
            product_id = %item.product_id,
            quantity = item.quantity,
            total = totals.total.units(),
            "Item added"
        );

        Ok(ItemChange { order, item })
    }

    /// Changes a line item's quantity. The snapshotted unit price stays.
    ///
    /// ## Errors
    /// In check order: `RoleDenied`, `OrderItemNotFound`, `InvalidOrderState`,
    /// `InvalidQuantity`.
    pub async fn update_item_quantity(
        &self,
        item_id: &str,
        quantity: i64,
        staff_id: &str,
    ) -> EngineResult<ItemChange> {
        self.roles.assert_role(staff_id, ORDER_TAKING_ROLES).await?;

        let mut tx = self.db.begin().await?;
        let order_id = OrderRepository::lock_for_item(&mut tx, item_id).await?;
        let order = OrderRepository::fetch_in(&mut tx, &order_id).await?;
        ensure_editable(&order_id, order.status)?;
        validate_quantity(quantity)?;

        let mut item = ItemRepository::fetch_in(&mut tx, item_id).await?;
        item.quantity = quantity;
        item.line_total = item.computed_line_total()?;
        ItemRepository::update_quantity_in(&mut tx, item_id, item.quantity, item.line_total)
            .await?;

        let totals = recompute_totals(&mut tx, &order_id, staff_id).await?;
        let order = OrderRepository::fetch_in(&mut tx, &order_id).await?;
        tx.commit().await?;

        info!(
            order_id = %order_id,
            item_id = %item_id,
            quantity,
            total = totals.total.units(),
            "Item quantity updated"
        );

        Ok(ItemChange { order, item })
    }

    /// Deletes a line item. An order left empty stays open.
    ///
    /// ## Errors
    /// `RoleDenied`, `OrderItemNotFound`, `InvalidOrderState`.
    pub async fn remove_item(&self, item_id: &str, staff_id: &str) -> EngineResult<Order> {
        self.roles.assert_role(staff_id, ORDER_TAKING_ROLES).await?;

        let mut tx = self.db.begin().await?;
        let order_id = OrderRepository::lock_for_item(&mut tx, item_id).await?;
        let order = OrderRepository::fetch_in(&mut tx, &order_id).await?;
        ensure_editable(&order_id, order.status)?;

        ItemRepository::delete_in(&mut tx, item_id).await?;
        let totals = recompute_totals(&mut tx, &order_id, staff_id).await?;
        let order = OrderRepository::fetch_in(&mut tx, &order_id).await?;
        tx.commit().await?;

        info!(
            order_id = %order_id,
            item_id = %item_id,
            total = totals.total.units(),
            "Item removed"
        );

        Ok(order)
    }
}

/// Re-derives and stores the order's totals from its live items.
async fn recompute_totals(
    conn: &mut SqliteConnection,
    order_id: &str,
    staff_id: &str,
) -> EngineResult<OrderTotals> {
    let items = ItemRepository::list_in(&mut *conn, order_id).await?;
    let totals = OrderTotals::from_items(&items)?;
    OrderRepository::write_totals_in(&mut *conn, order_id, &totals, staff_id).await?;
    Ok(totals)
}
