//! # External Payment Sessions
//!
//! Opens a hosted checkout for an order and returns where to send the
//! customer. Nothing is written: an abandoned checkout leaves the order
//! exactly as it was, still payable by any tender. The payment is recorded
//! later through `record_external_payment` when the gateway calls back.

use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::error::{EngineError, EngineResult};
use crate::service::OrderService;
use mesa_core::status::ensure_payable;
use mesa_core::validation::validate_return_base_url;
use mesa_core::{CoreError, Money, OrderTotals, ValidationError};
use mesa_gateway::PaymentRequest;

/// Where to redirect the customer, plus what the gateway was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub order_id: String,
    pub amount: Money,
    pub redirect_url: Url,
    pub callback_url: Url,
    pub tracking_id: String,
}

impl OrderService {
    /// Starts a hosted checkout for an order.
    ///
    /// ## Errors
    /// `InvalidOrderStatusTransition` unless pending/preparing/ready,
    /// `ShiftAlreadyClosed`, `OrderHasNoItems`, `GatewayNotConfigured`,
    /// and any gateway failure (no retry).
    pub async fn create_payment_session(
        &self,
        order_id: &str,
        return_base_url: &str,
    ) -> EngineResult<PaymentSession> {
        let return_base_url = validate_return_base_url(return_base_url)?;
        let gateway = self
            .gateway
            .as_ref()
            .ok_or(EngineError::GatewayNotConfigured)?;

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        ensure_payable(order_id, order.status)?;

        let shift_open = self
            .db
            .shifts()
            .get_by_id(&order.shift_id)
            .await?
            .is_some_and(|shift| shift.is_open());
        if !shift_open {
            return Err(CoreError::ShiftAlreadyClosed {
                order_id: order_id.to_string(),
                shift_id: order.shift_id,
            }
            .into());
        }

        let items = self.db.items().list_for_order(order_id).await?;
        if items.is_empty() {
            return Err(CoreError::OrderHasNoItems(order_id.to_string()).into());
        }
        let amount = OrderTotals::from_items(&items)?.total;

        let request = PaymentRequest {
            order_id: order_id.to_string(),
            amount,
            description: format!("Order {order_id}"),
            callback_url: callback_url(&return_base_url, order_id)?,
        };

        let token = gateway.request_token().await?;
        let submitted = gateway.submit_order(&token, &request).await?;

        info!(
            order_id = %order_id,
            tracking_id = %submitted.tracking_id,
            amount = amount.units(),
            "Payment session created"
        );

        Ok(PaymentSession {
            order_id: request.order_id,
            amount,
            redirect_url: submitted.redirect_url,
            callback_url: request.callback_url,
            tracking_id: submitted.tracking_id,
        })
    }
}

/// `{base}/orders/{order_id}/payment-return`
fn callback_url(base: &Url, order_id: &str) -> EngineResult<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);

    url.path_segments_mut()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "return_base_url".to_string(),
            reason: "cannot be a base URL".to_string(),
        })?
        .pop_if_empty()
        .extend(["orders", order_id, "payment-return"]);

    Ok(url)
}
