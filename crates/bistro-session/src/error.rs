//! # Session Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  std::io / serde_json ──► SessionError ◄── ValidationError (limits)    │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  GatewayError ──────────► CheckoutError ──► user_message() ──► UI       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bistro_core::ValidationError;
use thiserror::Error;

/// Errors from the cart store and its storage slot.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A cart mutation would break a cart limit.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Reading or writing the slot failed.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A storage backend lock was poisoned by a panicking writer.
    #[error("Storage lock poisoned")]
    LockPoisoned,
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from talking to the order endpoint.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Server answered with an `{ code, message }` error body.
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },

    /// Request never got an answer (DNS, connect, TLS, reset).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server answered with something that isn't the documented shape.
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::InvalidResponse(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// Why a checkout did not go through. The cart is untouched in every case.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    /// Checkout form failed local validation.
    #[error("Invalid checkout details: {0}")]
    Invalid(#[from] ValidationError),

    /// The server refused the order (prices changed, item unavailable...).
    #[error("Order rejected: {message}")]
    Rejected { code: String, message: String },

    /// The server could not be reached.
    #[error("Order service unavailable: {0}")]
    Unavailable(String),
}

impl CheckoutError {
    /// Text suitable for the checkout page.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::EmptyCart => "Your cart is empty.".to_string(),
            CheckoutError::Invalid(e) => e.to_string(),
            CheckoutError::Rejected { message, .. } => message.clone(),
            CheckoutError::Unavailable(_) => {
                "We could not reach the restaurant. Please try again.".to_string()
            }
        }
    }
}

impl From<GatewayError> for CheckoutError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { code, message } => CheckoutError::Rejected { code, message },
            GatewayError::Transport(msg) | GatewayError::InvalidResponse(msg) => {
                CheckoutError::Unavailable(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_rejection_keeps_server_message() {
        let err: CheckoutError = GatewayError::Rejected {
            code: "PRICE_CHANGED".to_string(),
            message: "Prices changed, please review your cart".to_string(),
        }
        .into();
        assert_eq!(err.user_message(), "Prices changed, please review your cart");
    }

    #[test]
    fn test_transport_failure_is_generic_for_users() {
        let err: CheckoutError = GatewayError::Transport("connection refused".to_string()).into();
        assert!(matches!(err, CheckoutError::Unavailable(_)));
        assert!(!err.user_message().contains("refused"));
    }
}
