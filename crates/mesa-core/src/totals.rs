//! # Order Totals
//!
//! Totals are never patched incrementally. Every item mutation and every
//! settlement re-derives them from the live line items:
//!
//! ```text
//! items ──► Σ (unit_price × quantity) ──► subtotal ──► total
//! ```
//!
//! Prices are tax-inclusive, so the tax component is always zero and
//! `total == subtotal`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::OrderItem;

/// Largest difference between a stored and a derived total that is not
/// treated as drift. Whole-unit money has no rounding, so any difference counts.
pub const TOTAL_DRIFT_TOLERANCE: Money = Money::from_units(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Derives totals from the live item set.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::OrderTotals;
    ///
    /// let totals = OrderTotals::from_items(&[]).unwrap();
    /// assert!(totals.total.is_zero());
    /// ```
    ///
    /// ## Errors
    /// `AmountOverflow` if a line total or the sum leaves the money range.
    pub fn from_items(items: &[OrderItem]) -> CoreResult<Self> {
        let lines = items
            .iter()
            .map(OrderItem::computed_line_total)
            .collect::<CoreResult<Vec<Money>>>()?;
        let subtotal = Money::checked_sum(lines, "order total")?;

        Ok(OrderTotals {
            subtotal,
            tax: Money::zero(),
            total: subtotal,
        })
    }

    /// Signed difference `stored - derived`, saturating at the i64 bounds.
    #[inline]
    pub fn drift_from(&self, stored_total: Money) -> Money {
        Money::from_units(stored_total.units().saturating_sub(self.total.units()))
    }

    /// True when the stored total no longer matches the items.
    #[inline]
    pub fn differs_from(&self, stored_total: Money) -> bool {
        self.drift_from(stored_total).abs() > TOTAL_DRIFT_TOLERANCE
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use chrono::Utc;

    fn item(unit_price: i64, quantity: i64) -> OrderItem {
        OrderItem {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: "order".into(),
            product_id: "product".into(),
            product_name: "Item".into(),
            quantity,
            unit_price: Money::from_units(unit_price),
            // Deliberately stale: totals must not trust the stored line total.
            line_total: Money::from_units(1),
            size: None,
            modifier: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_from_items_sums_live_lines() {
        let totals = OrderTotals::from_items(&[item(30_000, 1), item(20_000, 1)]).unwrap();
        assert_eq!(totals.subtotal.units(), 50_000);
        assert_eq!(totals.total.units(), 50_000);
        assert!(totals.tax.is_zero());
    }

    #[test]
    fn test_quantities_multiply() {
        let totals = OrderTotals::from_items(&[item(4_000, 3), item(1_500, 2)]).unwrap();
        assert_eq!(totals.total.units(), 15_000);
    }

    #[test]
    fn test_empty_order_is_zero() {
        assert_eq!(OrderTotals::from_items(&[]).unwrap(), OrderTotals::default());
    }

    #[test]
    fn test_drift_detection() {
        let totals = OrderTotals::from_items(&[item(20_000, 1)]).unwrap();
        assert!(!totals.differs_from(Money::from_units(20_000)));
        assert!(totals.differs_from(Money::from_units(50_000)));
        assert_eq!(totals.drift_from(Money::from_units(50_000)).units(), 30_000);
        assert_eq!(totals.drift_from(Money::from_units(19_000)).units(), -1_000);
    }

    #[test]
    fn test_overflowing_items_are_rejected() {
        let huge = i64::MAX / 2 + 1;
        assert!(matches!(
            OrderTotals::from_items(&[item(huge, 1), item(huge, 1)]),
            Err(CoreError::AmountOverflow {
                context: "order total"
            })
        ));
        assert!(matches!(
            OrderTotals::from_items(&[item(huge, 3)]),
            Err(CoreError::AmountOverflow {
                context: "line total"
            })
        ));
    }
}
