//! # Payment Settlement
//!
//! Three public entry points, one private settlement function. `settle` is
//! the only code that writes `served` after a payment.
//!
//! ```text
//! pay_order_cash ─────────┐
//! pay_order_momo ─────────┼──► settle(order, amount, method, staff, ref?)
//! record_external_payment ┘         │
//!                                   ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   1. lock order row                          OrderNotFound             │
//! │   2. reference already recorded?             → DuplicateReference      │
//! │   3. amount not positive?                    Validation                │
//! │   4. load order, live items, shift                                     │
//! │   5. shift ended?                            ShiftAlreadyClosed        │
//! │   6. no items?                               OrderHasNoItems           │
//! │   7. stored total ≠ Σ items?                 rewrite total, warn       │
//! │   8. status not payable?                     → AlreadySettled          │
//! │   9. amount < total?                         PaymentInsufficient       │
//! │  10. insert payment (completed)                                        │
//! │  11. status = served                                                   │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                                   │
//!                                   ▼
//!                  release table (dine-in, after commit)
//! ```
//!
//! Two outcomes are successes without effect: a reference that was
//! already recorded, and an order that another settlement already served.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::service::{OrderService, TILL_ROLES};
use mesa_core::status::is_payable;
use mesa_core::validation::{validate_external_reference, validate_payment_amount};
use mesa_core::{
    CoreError, Money, Order, OrderStatus, OrderTotals, Payment, PaymentMethod, PaymentStatus,
    SettlementOutcome, ValidationError, SYSTEM_STAFF_ID,
};
use mesa_db::{ItemRepository, OrderRepository, PaymentRepository, ShiftRepository};

/// UNIQUE index violated when two settlements race with the same reference.
const EXTERNAL_REFERENCE_COLUMN: &str = "payments.external_reference";

struct SettlementRequest<'a> {
    order_id: &'a str,
    amount: Money,
    method: PaymentMethod,
    staff_id: &'a str,
    external_reference: Option<String>,
}

impl OrderService {
    /// Settles an order with cash.
    ///
    /// Change is not recorded; the payment row carries the amount tendered.
    pub async fn pay_order_cash(
        &self,
        order_id: &str,
        amount: Money,
        staff_id: &str,
    ) -> EngineResult<SettlementOutcome> {
        self.roles.assert_role(staff_id, TILL_ROLES).await?;

        self.settle(SettlementRequest {
            order_id,
            amount,
            method: PaymentMethod::Cash,
            staff_id,
            external_reference: None,
        })
        .await
    }

    /// Settles an order with MTN mobile money confirmed at the till.
    pub async fn pay_order_momo(
        &self,
        order_id: &str,
        amount: Money,
        staff_id: &str,
    ) -> EngineResult<SettlementOutcome> {
        self.roles.assert_role(staff_id, TILL_ROLES).await?;

        self.settle(SettlementRequest {
            order_id,
            amount,
            method: PaymentMethod::MtnMomo,
            staff_id,
            external_reference: None,
        })
        .await
    }

    /// Records a payment confirmed by the external gateway.
    ///
    /// `staff_id` may be [`SYSTEM_STAFF_ID`] for callbacks the host has
    /// already authenticated; that id skips the role check. Replaying a
    /// reference returns `DuplicateReference` and changes nothing.
    pub async fn record_external_payment(
        &self,
        order_id: &str,
        amount: Money,
        method: PaymentMethod,
        staff_id: &str,
        external_reference: &str,
    ) -> EngineResult<SettlementOutcome> {
        if !method.is_external() {
            return Err(ValidationError::NotAllowed {
                field: "method".to_string(),
                allowed: vec![
                    PaymentMethod::Card.to_string(),
                    PaymentMethod::MtnMomo.to_string(),
                    PaymentMethod::AirtelMoney.to_string(),
                ],
            }
            .into());
        }

        if staff_id != SYSTEM_STAFF_ID {
            self.roles.assert_role(staff_id, TILL_ROLES).await?;
        }

        let external_reference = validate_external_reference(external_reference)?;

        self.settle(SettlementRequest {
            order_id,
            amount,
            method,
            staff_id,
            external_reference: Some(external_reference),
        })
        .await
    }

    /// The settlement function. See the module docs for the step list.
    async fn settle(&self, request: SettlementRequest<'_>) -> EngineResult<SettlementOutcome> {
        let order_id = request.order_id;
        let mut tx = self.db.begin().await?;

        OrderRepository::lock(&mut tx, order_id).await?;

        if let Some(reference) = request.external_reference.as_deref() {
            if PaymentRepository::find_by_reference_in(&mut tx, reference)
                .await?
                .is_some()
            {
                debug!(order_id = %order_id, reference = %reference, "Duplicate payment reference");
                return Ok(SettlementOutcome::DuplicateReference {
                    external_reference: reference.to_string(),
                });
            }
        }

        validate_payment_amount(request.amount)?;

        let order = OrderRepository::fetch_in(&mut tx, order_id).await?;
        let items = ItemRepository::list_in(&mut tx, order_id).await?;
        let shift = ShiftRepository::fetch_in(&mut tx, &order.shift_id).await?;

        if !shift.is_open() {
            return Err(CoreError::ShiftAlreadyClosed {
                order_id: order_id.to_string(),
                shift_id: shift.id,
            }
            .into());
        }

        if items.is_empty() {
            return Err(CoreError::OrderHasNoItems(order_id.to_string()).into());
        }

        let totals = OrderTotals::from_items(&items)?;
        if totals.differs_from(order.total) {
            warn!(
                order_id = %order_id,
                stored_total = order.total.units(),
                derived_total = totals.total.units(),
                drift = totals.drift_from(order.total).units(),
                "Stored order total drifted from its items; correcting"
            );
            OrderRepository::write_totals_in(&mut tx, order_id, &totals, request.staff_id).await?;
        }

        if !is_payable(order.status) {
            tx.commit().await?;
            debug!(order_id = %order_id, status = %order.status, "Order already settled");
            return Ok(SettlementOutcome::AlreadySettled {
                order_id: order_id.to_string(),
                status: order.status,
            });
        }

        if request.amount < totals.total {
            return Err(CoreError::PaymentInsufficient {
                amount: request.amount,
                total: totals.total,
            }
            .into());
        }

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            amount: request.amount,
            method: request.method,
            status: PaymentStatus::Completed,
            external_reference: request.external_reference.clone(),
            created_by: request.staff_id.to_string(),
            created_at: Utc::now(),
        };

        match PaymentRepository::insert_in(&mut tx, &payment).await {
            Ok(()) => {}
            // Same reference committed by a settlement of another order
            Err(err) if err.is_unique_violation_on(EXTERNAL_REFERENCE_COLUMN) => {
                if let Some(reference) = payment.external_reference {
                    return Ok(SettlementOutcome::DuplicateReference {
                        external_reference: reference,
                    });
                }
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        }

        OrderRepository::write_status_in(&mut tx, order_id, OrderStatus::Served, request.staff_id)
            .await?;
        tx.commit().await?;

        info!(
            order_id = %order_id,
            payment_id = %payment.id,
            amount = payment.amount.units(),
            total = totals.total.units(),
            method = %payment.method,
            "Order settled"
        );

        self.release_table_after_commit(&Order {
            status: OrderStatus::Served,
            ..order
        })
        .await;

        Ok(SettlementOutcome::Settled { payment })
    }
}
