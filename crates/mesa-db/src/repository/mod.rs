//! # Repository Module
//!
//! Database repository implementations for Mesa POS.
//!
//! ## Two Kinds of Methods
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  &self methods            → run on the pool, one statement each        │
//! │  db.orders().get_by_id(id)   (reads, seeding, post-commit hooks)       │
//! │                                                                         │
//! │  associated fns (…_in)    → run on the caller's transaction            │
//! │  OrderRepository::lock(&mut *tx, id)                                   │
//! │  ItemRepository::list_in(&mut *tx, id)                                 │
//! │  PaymentRepository::insert_in(&mut *tx, &payment)                      │
//! │                                                                         │
//! │  While a transaction is open, use only the `_in` functions.            │
//! │  An in-memory database has one connection and a pool call would        │
//! │  wait for the transaction that holds it.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`order::OrderRepository`] - Orders, row locking, kitchen queue
//! - [`item::ItemRepository`] - Order line items
//! - [`payment::PaymentRepository`] - Payments and reference lookup
//! - [`product::ProductRepository`] - Menu products
//! - [`shift::ShiftRepository`] - Shifts
//! - [`staff::StaffRepository`] - Staff accounts
//! - [`table::TableRepository`] - Dining table occupancy

pub mod item;
pub mod order;
pub mod payment;
pub mod product;
pub mod shift;
pub mod staff;
pub mod table;
