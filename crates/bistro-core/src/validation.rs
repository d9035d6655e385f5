//! # Validation Module
//!
//! Input validation for checkout forms, menu data and settings.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser session (bistro-session)                             │
//! │  ├── Cart limits before a mutation                                     │
//! │  └── Customer form before checkout                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Server (apps/server)                                         │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE + CheckoutPayload::verify                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::validation::{validate_currency_code, validate_quantity};
//!
//! validate_quantity(5).unwrap();
//! validate_currency_code("EUR").unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{CustomerInfo, Fulfilment};
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 100;
const MAX_ADDRESS_LEN: usize = 300;
const MAX_NOTES_LEN: usize = 500;

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a menu item name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
pub fn validate_menu_item_name(name: &str) -> ValidationResult<()> {
    required("name", name)?;
    max_len("name", name, MAX_NAME_LEN)
}

/// Validates a three-letter currency code.
///
/// ```rust
/// use bistro_core::validation::validate_currency_code;
///
/// assert!(validate_currency_code("USD").is_ok());
/// assert!(validate_currency_code("usd").is_ok());
/// assert!(validate_currency_code("US").is_err());
/// ```
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    required("currency", code)?;
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a 3-letter ISO 4217 code".to_string(),
        });
    }
    Ok(())
}

/// Validates a phone number loosely: digits plus the usual punctuation,
/// with at least 7 digits.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    required("phone", phone)?;

    let allowed = |c: char| c.is_ascii_digit() || " +-().".contains(c);
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !phone.trim().chars().all(allowed) || digits < 7 {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain at least 7 digits".to_string(),
        });
    }
    Ok(())
}

pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }
    Ok(())
}

/// Validates the checkout form.
///
/// ## Rules
/// - Name and phone are required
/// - Email, when given, must be well formed
/// - Address is required for delivery orders
pub fn validate_customer(info: &CustomerInfo, fulfilment: Fulfilment) -> ValidationResult<()> {
    required("name", &info.name)?;
    max_len("name", &info.name, MAX_NAME_LEN)?;
    validate_phone(&info.phone)?;

    if let Some(email) = info.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }

    match info.address.as_deref() {
        Some(address) if !address.trim().is_empty() => {
            max_len("address", address, MAX_ADDRESS_LEN)?;
        }
        _ if fulfilment.charges_delivery() => {
            return Err(ValidationError::Required {
                field: "address".to_string(),
            });
        }
        _ => {}
    }

    if let Some(notes) = info.notes.as_deref() {
        max_len("notes", notes, MAX_NOTES_LEN)?;
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (99)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (complimentary items).
///
/// ```rust
/// use bistro_core::validation::validate_price;
///
/// assert!(validate_price(1099).is_ok());
/// assert!(validate_price(0).is_ok());
/// assert!(validate_price(-100).is_err());
/// ```
pub fn validate_price(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of distinct lines in a cart or order.
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates an order id.
///
/// ```rust
/// use bistro_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    required("id", id)?;

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
