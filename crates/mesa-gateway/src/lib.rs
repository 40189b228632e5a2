//! # mesa-gateway: External Payment Gateway Client
//!
//! Hosted checkout for card and mobile money. The engine only needs to open
//! a session and hand the customer a redirect URL; the payment itself is
//! recorded when the gateway calls back.
//!
//! ## Module Organization
//!
//! - [`client`] - [`PaymentGateway`] trait and the reqwest-backed [`PesapalClient`]
//! - [`config`] - [`GatewayConfig`]
//! - [`error`] - [`GatewayError`]

pub mod client;
pub mod config;
pub mod error;

pub use client::{AccessToken, PaymentGateway, PaymentRequest, PesapalClient, SubmittedOrder};
pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
