//! # Domain Types
//!
//! Shared value types used throughout the storefront.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │   Fulfilment    │   │  CustomerInfo   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  Delivery       │   │  name           │       │
//! │  │  name           │   │  Pickup         │   │  phone          │       │
//! │  │  category       │   │  DineIn         │   │  email?         │       │
//! │  │  price_cents    │   └─────────────────┘   │  address?       │       │
//! │  │  is_available   │                         │  notes?         │       │
//! │  └─────────────────┘   ┌─────────────────┐   └─────────────────┘       │
//! │                        │    TaxRate      │                              │
//! │                        │  bps (u32)      │                              │
//! │                        │  800 = 8%       │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 800 bps = 8%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::from_bps(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Menu Item
// =============================================================================

/// A dish or drink on the menu.
///
/// This is the catalog record the menu listing hands to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItem {
    /// Menu item identifier.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Optional description shown on the menu card.
    pub description: Option<String>,

    /// Menu section, e.g. "Pizza" or "Desserts".
    pub category: String,

    /// Price in cents of the base currency.
    pub price_cents: i64,

    /// Whether the kitchen currently offers this item.
    pub is_available: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Fulfilment
// =============================================================================

/// How an order reaches the customer.
///
/// Only delivery carries the flat delivery fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Fulfilment {
    #[default]
    Delivery,
    Pickup,
    DineIn,
}

impl Fulfilment {
    /// Whether this fulfilment charges the delivery fee.
    #[inline]
    pub const fn charges_delivery(&self) -> bool {
        matches!(self, Fulfilment::Delivery)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Fulfilment::Delivery => "delivery",
            Fulfilment::Pickup => "pickup",
            Fulfilment::DineIn => "dine_in",
        }
    }
}

// =============================================================================
// Customer Info
// =============================================================================

/// Contact details captured by the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Required for delivery orders.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(rate.bps(), 825);
        assert!(!rate.is_zero());
        assert!(TaxRate::zero().is_zero());
    }

    #[test]
    fn test_tax_rate_default_is_eight_percent() {
        assert_eq!(TaxRate::default().bps(), 800);
    }

    #[test]
    fn test_fulfilment_delivery_fee_rule() {
        assert!(Fulfilment::Delivery.charges_delivery());
        assert!(!Fulfilment::Pickup.charges_delivery());
        assert!(!Fulfilment::DineIn.charges_delivery());
    }

    #[test]
    fn test_fulfilment_serde_names() {
        let json = serde_json::to_string(&Fulfilment::DineIn).unwrap();
        assert_eq!(json, "\"dine_in\"");
        let parsed: Fulfilment = serde_json::from_str("\"pickup\"").unwrap();
        assert_eq!(parsed, Fulfilment::Pickup);
    }

    #[test]
    fn test_customer_info_optional_fields_default() {
        let info: CustomerInfo =
            serde_json::from_str(r#"{"name":"Ada","phone":"555-0100"}"#).unwrap();
        assert_eq!(info.name, "Ada");
        assert!(info.email.is_none());
        assert!(info.address.is_none());
    }
}
