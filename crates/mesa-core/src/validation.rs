//! # Validation Module
//!
//! Input validation utilities for Mesa POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (HTTP handler, CLI)                                   │
//! │  └── Deserialization, basic shape                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: mesa-engine operation                                        │
//! │  └── THIS MODULE: business input rules                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 1)                                             │
//! │  ├── UNIQUE (payments.external_reference)                              │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use url::Url;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of free-form line item fields (size, modifier, notes).
pub const MAX_FREE_TEXT_LEN: usize = 500;

/// Largest quantity a single line item may carry.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a gateway reference.
pub const MAX_EXTERNAL_REFERENCE_LEN: usize = 128;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// Zero, negative and oversized quantities are rejected, never coerced.
///
/// ## Example
/// ```rust
/// use mesa_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(999).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(1_000).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> CoreResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
        return Err(CoreError::InvalidQuantity { quantity });
    }

    Ok(())
}

/// Validates a payment amount.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a gateway reference and returns it trimmed.
pub fn validate_external_reference(reference: &str) -> ValidationResult<String> {
    let reference = reference.trim();

    if reference.is_empty() {
        return Err(ValidationError::Required {
            field: "external_reference".to_string(),
        });
    }

    if reference.len() > MAX_EXTERNAL_REFERENCE_LEN {
        return Err(ValidationError::TooLong {
            field: "external_reference".to_string(),
            max: MAX_EXTERNAL_REFERENCE_LEN,
        });
    }

    Ok(reference.to_string())
}

/// Normalizes an optional free-form item field (size, modifier, notes).
///
/// Blank strings become `None`.
pub fn normalize_free_text(field: &str, value: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if value.len() > MAX_FREE_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_FREE_TEXT_LEN,
        });
    }

    Ok(Some(value.to_string()))
}

/// Validates the base URL the gateway redirects back to.
///
/// ## Rules
/// - Must parse as an absolute URL
/// - Scheme must be http or https
///
/// ## Example
/// ```rust
/// use mesa_core::validation::validate_return_base_url;
///
/// assert!(validate_return_base_url("https://pos.example.com").is_ok());
/// assert!(validate_return_base_url("ftp://pos.example.com").is_err());
/// assert!(validate_return_base_url("not a url").is_err());
/// ```
pub fn validate_return_base_url(raw: &str) -> ValidationResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| ValidationError::InvalidFormat {
        field: "return_base_url".to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::NotAllowed {
            field: "return_base_url scheme".to_string(),
            allowed: vec!["http".to_string(), "https".to_string()],
        });
    }

    Ok(url)
}

// =============================================================================
// Unit Tests
// =============================================================================
