//! Kitchen-side status changes.
//!
//! The kitchen moves orders along its own, smaller table
//! (`mesa_core::status::KITCHEN_TRANSITIONS`):
//!
//! ```text
//! pending   ──preparing──► preparing
//! preparing ──ready──────► served
//! ```
//!
//! Anything else is `InvalidKitchenStatusTransition`.

use tracing::info;

use crate::error::EngineResult;
use crate::service::{OrderService, KITCHEN_ROLES};
use mesa_core::status::resolve_kitchen_transition;
use mesa_core::{Order, OrderStatus};
use mesa_db::OrderRepository;

impl OrderService {
    /// Applies a kitchen transition and returns the updated order.
    ///
    /// `requested` is what the kitchen screen asked for; the stored status
    /// can differ (`ready` is stored as `served`).
    pub async fn update_kitchen_status(
        &self,
        order_id: &str,
        requested: OrderStatus,
        staff_id: &str,
    ) -> EngineResult<Order> {
        self.roles.assert_role(staff_id, KITCHEN_ROLES).await?;

        let mut tx = self.db.begin().await?;
        OrderRepository::lock(&mut tx, order_id).await?;
        let order = OrderRepository::fetch_in(&mut tx, order_id).await?;

        let stored = resolve_kitchen_transition(order_id, order.status, requested)?;

        OrderRepository::write_status_in(&mut tx, order_id, stored, staff_id).await?;
        let order = OrderRepository::fetch_in(&mut tx, order_id).await?;
        tx.commit().await?;

        info!(
            order_id = %order_id,
            requested = %requested,
            stored = %stored,
            "Kitchen status updated"
        );

        Ok(order)
    }
}
