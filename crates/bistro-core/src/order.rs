//! # Orders
//!
//! The checkout payload a session submits, and the order the server keeps.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Session                          Server                                │
//! │  ───────                          ──────                                │
//! │  Cart ──from_cart()──► CheckoutPayload ──POST /api/orders──►            │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                           verify(menu, policy)                          │
//! │                           • items present, qty in range                 │
//! │                           • each item on the menu + available           │
//! │                           • prices match the menu                       │
//! │                           • totals match the recomputation              │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │  ◄──────── OrderReceipt { orderId } ── Order (status = pending)         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Lifecycle
//! ```text
//! pending ──► preparing ──► ready ──► delivered
//!    │            │           │
//!    └────────────┴───────────┴──► cancelled
//! ```
//! Only staff move orders along these edges. Pricing never touches status.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLineItem};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{PriceBreakdown, PricingPolicy};
use crate::types::{CustomerInfo, Fulfilment, MenuItem};
use crate::validation;

// =============================================================================
// Order Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "preparing" => Some(OrderStatus::Preparing),
            "ready" => Some(OrderStatus::Ready),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Delivered and cancelled orders never change again.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Preparing)
                | (Preparing, Ready)
                | (Ready, Delivered)
                | (Pending, Cancelled)
                | (Preparing, Cancelled)
                | (Ready, Cancelled)
        )
    }

    /// Returns `next` if the edge is allowed.
    pub fn transition_to(&self, next: OrderStatus) -> CoreResult<OrderStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A persisted order header.
///
/// Customer fields are stored flat; [`Order::customer`] reassembles them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    /// UUID assigned by the server.
    pub id: String,
    pub status: OrderStatus,
    pub fulfilment: Fulfilment,

    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,

    /// Currency the customer was viewing; amounts are still base currency.
    pub currency_code: String,

    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn customer(&self) -> CustomerInfo {
        CustomerInfo {
            name: self.customer_name.clone(),
            phone: self.customer_phone.clone(),
            email: self.customer_email.clone(),
            address: self.customer_address.clone(),
            notes: self.notes.clone(),
        }
    }

    pub fn totals(&self) -> PriceBreakdown {
        PriceBreakdown {
            subtotal: Money::from_cents(self.subtotal_cents),
            tax: Money::from_cents(self.tax_cents),
            delivery_fee: Money::from_cents(self.delivery_fee_cents),
            total: Money::from_cents(self.total_cents),
        }
    }
}

/// A line of an order, frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: String,
    pub menu_item_id: i64,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

/// Order header plus its lines, as returned by `GET /api/orders/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// What the session gets back after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderReceipt {
    pub order_id: String,
}

// =============================================================================
// Checkout Payload
// =============================================================================

/// One line of the checkout payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutItem {
    pub id: i64,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

impl From<&CartLineItem> for CheckoutItem {
    fn from(line: &CartLineItem) -> Self {
        CheckoutItem {
            id: line.item_id,
            name: line.name.clone(),
            price: line.unit_price,
            quantity: line.quantity,
        }
    }
}

/// The body of `POST /api/orders`.
///
/// Amounts are base-currency cents. `currency_code` records which currency
/// the customer was shown, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutPayload {
    pub items: Vec<CheckoutItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub customer_info: CustomerInfo,
    #[serde(default)]
    pub fulfilment: Fulfilment,
    pub currency_code: String,
}

impl CheckoutPayload {
    /// Snapshots a cart and its totals.
    pub fn from_cart(
        cart: &Cart,
        policy: &PricingPolicy,
        fulfilment: Fulfilment,
        customer_info: CustomerInfo,
        currency_code: impl Into<String>,
    ) -> Self {
        let totals = PriceBreakdown::compute(cart, policy, fulfilment);
        CheckoutPayload {
            items: cart.items().iter().map(CheckoutItem::from).collect(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            delivery_fee: totals.delivery_fee,
            total: totals.total,
            customer_info,
            fulfilment,
            currency_code: currency_code.into(),
        }
    }

    /// The totals the client claims.
    pub fn claimed_totals(&self) -> PriceBreakdown {
        PriceBreakdown {
            subtotal: self.subtotal,
            tax: self.tax,
            delivery_fee: self.delivery_fee,
            total: self.total,
        }
    }

    /// Server-side check of a submitted payload.
    ///
    /// `menu` resolves an item id to the current menu record. Returns the
    /// totals recomputed from menu prices; the caller persists those rather
    /// than the client's figures.
    pub fn verify<'a, F>(&self, menu: F, policy: &PricingPolicy) -> CoreResult<PriceBreakdown>
    where
        F: Fn(i64) -> Option<&'a MenuItem>,
    {
        if self.items.is_empty() {
            return Err(CoreError::EmptyOrder);
        }
        validation::validate_cart_size(self.items.len())?;
        validation::validate_customer(&self.customer_info, self.fulfilment)?;
        validation::validate_currency_code(&self.currency_code)?;

        let mut seen = HashSet::new();
        let mut priced = Cart::new();
        for item in &self.items {
            if !seen.insert(item.id) {
                return Err(ValidationError::Duplicate {
                    field: "item".to_string(),
                    value: item.id.to_string(),
                }
                .into());
            }
            validation::validate_quantity(i64::from(item.quantity))?;
            validation::validate_price(item.price.cents())?;

            let menu_item = menu(item.id).ok_or(CoreError::MenuItemNotFound(item.id))?;
            if !menu_item.is_available {
                return Err(CoreError::MenuItemUnavailable(item.id));
            }
            if menu_item.price_cents != item.price.cents() {
                return Err(CoreError::PriceMismatch {
                    item_id: item.id,
                    expected: menu_item.price_cents,
                    actual: item.price.cents(),
                });
            }

            priced.add_item(&menu_item.into(), item.quantity);
        }

        let expected = PriceBreakdown::compute(&priced, policy, self.fulfilment);
        let claimed = self.claimed_totals();
        for (field, e, a) in [
            ("subtotal", expected.subtotal, claimed.subtotal),
            ("tax", expected.tax, claimed.tax),
            ("deliveryFee", expected.delivery_fee, claimed.delivery_fee),
            ("total", expected.total, claimed.total),
        ] {
            if e != a {
                return Err(CoreError::TotalsMismatch {
                    field: field.to_string(),
                    expected: e.cents(),
                    actual: a.cents(),
                });
            }
        }

        Ok(expected)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CatalogItem;
    use crate::types::TaxRate;
    use std::collections::HashMap;

    fn menu() -> HashMap<i64, MenuItem> {
        let now = Utc::now();
        let item = |id: i64, name: &str, price: i64, available: bool| MenuItem {
            id,
            name: name.to_string(),
            description: None,
            category: "Mains".to_string(),
            price_cents: price,
            is_available: available,
            created_at: now,
            updated_at: now,
        };
        [
            item(1, "Lasagna", 1000, true),
            item(2, "Bruschetta", 550, true),
            item(3, "Seasonal Soup", 700, false),
        ]
        .into_iter()
        .map(|m| (m.id, m))
        .collect()
    }

    fn policy() -> PricingPolicy {
        PricingPolicy::new(TaxRate::from_bps(800), Money::from_cents(599))
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Ada Lovelace".to_string(),
            phone: "+1 555 0100".to_string(),
            address: Some("12 Analytical St".to_string()),
            ..Default::default()
        }
    }

    fn payload() -> CheckoutPayload {
        let menu = menu();
        let mut cart = Cart::new();
        cart.add_item(&CatalogItem::from(&menu[&1]), 2);
        cart.add_item(&CatalogItem::from(&menu[&2]), 1);
        CheckoutPayload::from_cart(&cart, &policy(), Fulfilment::Delivery, customer(), "USD")
    }

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Delivered));
        assert!(Ready.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Ready));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_terminal_statuses_have_no_exits() {
        for from in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert!(from.is_terminal());
            for to in [
                OrderStatus::Pending,
                OrderStatus::Preparing,
                OrderStatus::Ready,
                OrderStatus::Delivered,
                OrderStatus::Cancelled,
            ] {
                assert!(from.transition_to(to).is_err());
            }
        }
    }

    #[test]
    fn test_status_parse_and_serde() {
        assert_eq!(OrderStatus::parse("ready"), Some(OrderStatus::Ready));
        assert_eq!(OrderStatus::parse("READY"), None);
        assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), "\"cancelled\"");
    }

    #[test]
    fn test_from_cart_payload_shape() {
        let json = serde_json::to_value(payload()).unwrap();
        assert_eq!(json["subtotal"], 2550);
        assert_eq!(json["tax"], 204);
        assert_eq!(json["deliveryFee"], 599);
        assert_eq!(json["total"], 3353);
        assert_eq!(json["fulfilment"], "delivery");
        assert_eq!(json["currencyCode"], "USD");
        assert_eq!(json["items"][0]["id"], 1);
        assert_eq!(json["items"][0]["price"], 1000);
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["customerInfo"]["name"], "Ada Lovelace");
    }

    #[test]
    fn test_verify_accepts_honest_payload() {
        let menu = menu();
        let totals = payload().verify(|id| menu.get(&id), &policy()).unwrap();
        assert_eq!(totals.total.cents(), 3353);
    }

    #[test]
    fn test_verify_rejects_tampered_total() {
        let menu = menu();
        let mut p = payload();
        p.total = Money::from_cents(100);
        let err = p.verify(|id| menu.get(&id), &policy()).unwrap_err();
        assert!(matches!(err, CoreError::TotalsMismatch { ref field, .. } if field == "total"));
    }

    #[test]
    fn test_verify_rejects_stale_price() {
        let menu = menu();
        let mut p = payload();
        p.items[0].price = Money::from_cents(900);
        let err = p.verify(|id| menu.get(&id), &policy()).unwrap_err();
        assert!(matches!(err, CoreError::PriceMismatch { item_id: 1, .. }));
    }

    #[test]
    fn test_verify_rejects_unknown_and_unavailable_items() {
        let menu = menu();
        let mut p = payload();
        p.items[0].id = 99;
        assert!(matches!(
            p.verify(|id| menu.get(&id), &policy()),
            Err(CoreError::MenuItemNotFound(99))
        ));

        let mut p = payload();
        p.items[0].id = 3;
        assert!(matches!(
            p.verify(|id| menu.get(&id), &policy()),
            Err(CoreError::MenuItemUnavailable(3))
        ));
    }

    #[test]
    fn test_verify_rejects_empty_and_duplicates() {
        let menu = menu();
        let mut p = payload();
        p.items.clear();
        assert!(matches!(p.verify(|id| menu.get(&id), &policy()), Err(CoreError::EmptyOrder)));

        let mut p = payload();
        let first = p.items[0].clone();
        p.items.push(first);
        assert!(matches!(
            p.verify(|id| menu.get(&id), &policy()),
            Err(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[test]
    fn test_verify_requires_address_for_delivery() {
        let menu = menu();
        let mut p = payload();
        p.customer_info.address = None;
        assert!(matches!(
            p.verify(|id| menu.get(&id), &policy()),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[test]
    fn test_pickup_payload_without_fee_verifies() {
        let menu = menu();
        let mut cart = Cart::new();
        cart.add_item(&CatalogItem::from(&menu[&2]), 2);
        let mut info = customer();
        info.address = None;
        let p = CheckoutPayload::from_cart(&cart, &policy(), Fulfilment::Pickup, info, "EUR");

        assert!(p.delivery_fee.is_zero());
        assert!(p.verify(|id| menu.get(&id), &policy()).is_ok());
    }
}
