//! # Engine Error Types
//!
//! The one error type callers of `mesa-engine` match on.
//!
//! ```text
//! CoreError ───────────────────────────────► EngineError::Domain
//! DbError::Domain(CoreError) ──unwrapped───► EngineError::Domain
//! DbError (anything else) ─────────────────► EngineError::Database
//! GatewayError ────────────────────────────► EngineError::Gateway
//! ```
//!
//! A rule that fails deep inside a transaction therefore surfaces the same
//! way as one checked up front.

use thiserror::Error;

use crate::config::ConfigError;
use mesa_core::{CoreError, ValidationError};
use mesa_db::DbError;
use mesa_gateway::GatewayError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A business rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Storage failed for a reason unrelated to the rules.
    #[error("Database error: {0}")]
    Database(DbError),

    /// The payment gateway call failed.
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// A payment session was requested but no gateway is configured.
    #[error("Payment gateway is not configured")]
    GatewayNotConfigured,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// The domain error, if this is one.
    pub fn domain(&self) -> Option<&CoreError> {
        match self {
            EngineError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => EngineError::Domain(core),
            other => EngineError::Database(other),
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Domain(CoreError::Validation(err))
    }
}

/// `tx.commit()` returns a bare `sqlx::Error`.
impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Database(DbError::from(err))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
