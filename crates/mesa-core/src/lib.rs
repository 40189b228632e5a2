//! # mesa-core: Pure Business Logic for Mesa POS
//!
//! This crate holds the rules of the order lifecycle as pure functions:
//! money arithmetic, the order/kitchen status graphs, totals derivation and
//! input validation. Nothing here touches a database or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mesa POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Callers (HTTP handlers, CLIs, webhooks)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    mesa-engine (operations)                     │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼───────────────┐   ┌──────────────▼───────────────┐   │
//! │  │      mesa-db (SQLite)        │   │   mesa-gateway (HTTP)        │   │
//! │  └──────────────┬───────────────┘   └──────────────────────────────┘   │
//! │                 │                                                       │
//! │  ┌──────────────▼──────────────────────────────────────────────────┐   │
//! │  │               ★ mesa-core (THIS CRATE) ★                        │   │
//! │  │   types • money • status • totals • validation • error        │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, OrderItem, Payment, Shift, ...)
//! - [`money`] - Whole-unit integer money (no floating point!)
//! - [`status`] - Table-driven order and kitchen transition graphs
//! - [`totals`] - Order totals derived from live line items
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use mesa_core::money::Money;
//! use mesa_core::status::is_payable;
//! use mesa_core::OrderStatus;
//!
//! let price = Money::from_units(30_000);
//! assert_eq!(price.multiply_quantity(2).unwrap().units(), 60_000);
//!
//! assert!(is_payable(OrderStatus::Ready));
//! assert!(!is_payable(OrderStatus::Served));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod status;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use totals::OrderTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Staff id used by gateway callbacks that were authenticated out-of-band.
///
/// Payments recorded under this id skip the staff role check.
pub const SYSTEM_STAFF_ID: &str = "system";

/// Currency code for the single-currency deployment.
pub const DEFAULT_CURRENCY: &str = "UGX";
