//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Whole Currency Units                                     │
//! │    The deployment currency (UGX) has no minor unit in circulation,      │
//! │    so every amount is an exact i64 count of whole units.                │
//! │    30000 + 20000 = 50000, always.                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mesa_core::money::Money;
//!
//! let price = Money::from_units(30_000);
//! let line = price.multiply_quantity(2).unwrap();
//! assert_eq!(line.units(), 60_000);
//! ```
//!
//! Line totals and order totals go through the checked helpers
//! (`multiply_quantity`, `checked_add`, `checked_sum`). An amount that
//! does not fit in an i64 is `CoreError::AmountOverflow`, never a wrap.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in whole currency units.
///
/// ## Design Decisions
/// - **i64 (signed)**: differences (drift, shortfall) can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent sqlx type**: stored as a plain INTEGER column
///
/// ## Where Money Flows
/// ```text
/// Product.price ──► OrderItem.unit_price ──► OrderItem.line_total
///                                                  │
///                                                  ▼
///                     Payment.amount ◄── compare ── Order.total (Σ line totals)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// let price = Money::from_units(20_000);
    /// assert_eq!(price.units(), 20_000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in whole currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Multiplies a unit price by a line quantity.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// let unit_price = Money::from_units(4_500);
    /// assert_eq!(unit_price.multiply_quantity(3).unwrap().units(), 13_500);
    /// assert!(Money::from_units(i64::MAX).multiply_quantity(2).is_err());
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> CoreResult<Money> {
        self.0
            .checked_mul(qty)
            .map(Money)
            .ok_or(CoreError::AmountOverflow {
                context: "line total",
            })
    }

    /// Addition that returns `None` instead of wrapping.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(units) => Some(Money(units)),
            None => None,
        }
    }

    /// Sums amounts, failing with `AmountOverflow` if the total leaves i64.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// let lines = [Money::from_units(30_000), Money::from_units(20_000)];
    /// assert_eq!(Money::checked_sum(lines, "order total").unwrap().units(), 50_000);
    /// ```
    pub fn checked_sum<I>(amounts: I, context: &'static str) -> CoreResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
            .ok_or(CoreError::AmountOverflow { context })
    }

    /// Subtraction clamped at zero.
    ///
    /// Used for "balance due" and "change due" style projections where a
    /// negative amount has no meaning to the cashier.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// let total = Money::from_units(50_000);
    /// let paid = Money::from_units(60_000);
    /// assert!(total.saturating_sub(paid).is_zero());
    /// assert_eq!(paid.saturating_sub(total).units(), 10_000);
    /// ```
    #[inline]
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display with thousands separators, e.g. `UGX 30,000`.
///
/// ## Note
/// This is for logs and diagnostics. Receipt formatting is a caller concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{} {}", sign, crate::DEFAULT_CURRENCY, grouped)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        let money = Money::from_units(30_000);
        assert_eq!(money.units(), 30_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_units(30_000).to_string(), "UGX 30,000");
        assert_eq!(Money::from_units(500).to_string(), "UGX 500");
        assert_eq!(Money::from_units(1_250_000).to_string(), "UGX 1,250,000");
        assert_eq!(Money::from_units(-4_000).to_string(), "-UGX 4,000");
        assert_eq!(Money::zero().to_string(), "UGX 0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(30_000);
        let b = Money::from_units(20_000);

        assert_eq!((a + b).units(), 50_000);
        assert_eq!((a - b).units(), 10_000);
        assert_eq!(b.multiply_quantity(3).unwrap().units(), 60_000);

        let mut running = a;
        running += b;
        running -= Money::from_units(5_000);
        assert_eq!(running.units(), 45_000);
    }

    #[test]
    fn test_checked_sum() {
        let amounts = [
            Money::from_units(1_000),
            Money::from_units(2_500),
            Money::from_units(500),
        ];
        assert_eq!(Money::checked_sum(amounts, "test").unwrap().units(), 4_000);
        assert!(Money::checked_sum([], "test").unwrap().is_zero());

        let err = Money::checked_sum([Money::from_units(i64::MAX), Money::from_units(1)], "order total")
            .unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { context: "order total" }));
    }

    #[test]
    fn test_multiply_quantity_overflow() {
        let price = Money::from_units(30_000);
        assert_eq!(price.multiply_quantity(999).unwrap().units(), 29_970_000);
        assert!(matches!(
            price.multiply_quantity(i64::MAX / 1000),
            Err(CoreError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_units(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().units(), 100);
    }

    #[test]
    fn test_saturating_sub() {
        let total = Money::from_units(50_000);
        assert_eq!(total.saturating_sub(Money::from_units(20_000)).units(), 30_000);
        assert!(total.saturating_sub(Money::from_units(80_000)).is_zero());
        assert!(Money::from_units(i64::MIN).saturating_sub(total).is_zero());
    }

    #[test]
    fn test_serde_is_plain_integer() {
        let json = serde_json::to_string(&Money::from_units(20_000)).unwrap();
        assert_eq!(json, "20000");
        let back: Money = serde_json::from_str("20000").unwrap();
        assert_eq!(back, Money::from_units(20_000));
    }
}
