//! # Gateway Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Gateway Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Protocol            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Transport      │  │  Rejected               │ │
//! │  │  InvalidUrl     │  │  Status         │  │  MissingField           │ │
//! │  │                 │  │                 │  │  InvalidResponse        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are retried here. Calls are single-attempt.

use thiserror::Error;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Gateway settings are missing or inconsistent.
    #[error("Invalid gateway configuration: {0}")]
    InvalidConfig(String),

    /// A URL could not be built or parsed.
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Connection, TLS or timeout failure.
    #[error("Gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("Gateway {endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// The gateway answered 2xx but reported an error in the body.
    #[error("Gateway rejected {endpoint}: [{code}] {message}")]
    Rejected {
        endpoint: &'static str,
        code: String,
        message: String,
    },

    /// A field the flow depends on was absent from the response.
    #[error("Gateway {endpoint} response is missing '{field}'")]
    MissingField {
        endpoint: &'static str,
        field: &'static str,
    },

    /// The response body was not the JSON we expected.
    #[error("Gateway {endpoint} returned an unreadable body: {reason}")]
    InvalidResponse {
        endpoint: &'static str,
        reason: String,
    },
}

impl GatewayError {
    /// True for failures that happened before the gateway produced an answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}
