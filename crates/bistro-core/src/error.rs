//! # Error Types
//!
//! Domain-specific error types for bistro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bistro-core errors (this file)                                        │
//! │  ├── CoreError        - Cart / order / checkout rule violations        │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── CurrencyError    - Invalid currency reference data                │
//! │                                                                         │
//! │  bistro-db            └── DbError       - Database failures            │
//! │  bistro-session       └── SessionError  - Storage slot / checkout      │
//! │  apps/server          └── ApiError      - What the frontend sees       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Menu item id is not in the catalog.
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(i64),

    /// Menu item exists but the kitchen is not offering it.
    #[error("Menu item {0} is not available")]
    MenuItemUnavailable(i64),

    /// Staff tried to move an order along an edge the lifecycle forbids.
    ///
    /// ## Lifecycle
    /// ```text
    /// pending ──► preparing ──► ready ──► delivered
    ///    │            │           │
    ///    └────────────┴───────────┴──► cancelled
    /// ```
    #[error("Order cannot move from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Checkout was submitted with no line items.
    #[error("Order has no items")]
    EmptyOrder,

    /// A client-side total disagrees with the server's recomputation.
    #[error("{field} mismatch: expected {expected}, got {actual}")]
    TotalsMismatch {
        field: String,
        expected: i64,
        actual: i64,
    },

    /// A line item price disagrees with the current menu price.
    #[error("Price for item {item_id} changed: menu says {expected}, cart says {actual}")]
    PriceMismatch {
        item_id: i64,
        expected: i64,
        actual: i64,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Currency error: {0}")]
    Currency(#[from] CurrencyError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before business logic runs, typically on checkout form input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed phone number or email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., the same menu item twice in one payload).
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Currency Error
// =============================================================================

/// Errors in currency reference data.
///
/// Rates are checked when settings are built, so conversion itself is total.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    /// Zero, negative or missing exchange rate.
    #[error("Invalid exchange rate {rate} for {code}")]
    InvalidRate { code: String, rate: String },

    #[error("Invalid currency code: {0}")]
    InvalidCode(String),

    /// Settings list has no currency marked as default.
    #[error("No default currency configured")]
    NoDefault,

    #[error("More than one default currency configured: {0:?}")]
    MultipleDefaults(Vec<String>),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::TotalsMismatch {
            field: "total".to_string(),
            expected: 3353,
            actual: 3300,
        };
        assert_eq!(err.to_string(), "total mismatch: expected 3353, got 3300");

        let err = CoreError::InvalidStatusTransition {
            from: "delivered".to_string(),
            to: "pending".to_string(),
        };
        assert_eq!(err.to_string(), "Order cannot move from delivered to pending");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "phone".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = CurrencyError::NoDefault.into();
        assert!(matches!(core_err, CoreError::Currency(CurrencyError::NoDefault)));
    }
}
