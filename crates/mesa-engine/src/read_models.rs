//! Read-only views: single order, shift order list, receipt, kitchen queue.
//!
//! These run on the pool without a transaction and never write.

use crate::error::EngineResult;
use crate::service::OrderService;
use mesa_core::{CoreError, KitchenTicket, KitchenTicketItem, Money, Order, Receipt};

impl OrderService {
    pub async fn get_order(&self, order_id: &str) -> EngineResult<Order> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
        Ok(order)
    }

    /// Orders of one shift, oldest first.
    pub async fn list_shift_orders(&self, shift_id: &str) -> EngineResult<Vec<Order>> {
        Ok(self.db.orders().list_by_shift(shift_id).await?)
    }

    /// Builds a receipt from the current rows.
    ///
    /// `balance_due` and `change_due` are never negative; at most one of
    /// them is non-zero.
    pub async fn get_order_receipt(&self, order_id: &str) -> EngineResult<Receipt> {
        let order = self.get_order(order_id).await?;
        let items = self.db.items().list_for_order(order_id).await?;
        let payments = self.db.payments().list_for_order(order_id).await?;

        let total_paid = Money::checked_sum(payments.iter().map(|p| p.amount), "total paid")?;
        let balance_due = order.total.saturating_sub(total_paid);
        let change_due = total_paid.saturating_sub(order.total);

        Ok(Receipt {
            order,
            items,
            payments,
            total_paid,
            balance_due,
            change_due,
        })
    }

    /// Pending and preparing orders of a shift, first in first out.
    pub async fn get_kitchen_queue(&self, shift_id: &str) -> EngineResult<Vec<KitchenTicket>> {
        let orders = self.db.orders().list_kitchen_queue(shift_id).await?;

        let mut tickets = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.db.items().list_for_order(&order.id).await?;
            tickets.push(KitchenTicket {
                order_id: order.id,
                order_type: order.order_type,
                table_id: order.table_id,
                status: order.status,
                created_at: order.created_at,
                items: items.iter().map(KitchenTicketItem::from).collect(),
            });
        }

        Ok(tickets)
    }
}
