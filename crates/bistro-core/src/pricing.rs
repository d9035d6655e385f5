//! # Pricing
//!
//! Derives the money figures shown in the cart and sent with the order.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   subtotal     = Σ unit_price × quantity          (exact)               │
//! │   tax          = subtotal × tax_rate               (rounded once)       │
//! │   delivery_fee = flat fee if delivery and cart non-empty, else 0        │
//! │   total        = subtotal + tax + delivery_fee     (exact)              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is a pure function of the cart and the policy. The
//! same functions run in the browser session and on the server, so the
//! server can recompute what the client claims.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::money::Money;
use crate::types::{Fulfilment, TaxRate};

// =============================================================================
// Pricing Policy
// =============================================================================

/// Per-deployment pricing constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingPolicy {
    pub tax_rate: TaxRate,
    pub delivery_fee: Money,
}

impl PricingPolicy {
    pub const fn new(tax_rate: TaxRate, delivery_fee: Money) -> Self {
        PricingPolicy {
            tax_rate,
            delivery_fee,
        }
    }
}

impl Default for PricingPolicy {
    /// 8% tax, 5.99 delivery fee.
    fn default() -> Self {
        PricingPolicy::new(
            TaxRate::from_bps(crate::DEFAULT_TAX_RATE_BPS),
            Money::from_cents(crate::DEFAULT_DELIVERY_FEE_CENTS),
        )
    }
}

// =============================================================================
// Pricing Functions
// =============================================================================

/// Σ unit price × quantity over all lines.
pub fn subtotal(cart: &Cart) -> Money {
    cart.items().iter().map(|l| l.line_total()).sum()
}

/// Tax on the subtotal, rounded half away from zero to the cent.
pub fn tax(cart: &Cart, rate: TaxRate) -> Money {
    subtotal(cart).calculate_tax(rate)
}

/// The flat delivery fee, or zero for an empty cart or a non-delivery order.
pub fn delivery_fee(cart: &Cart, policy: &PricingPolicy, fulfilment: Fulfilment) -> Money {
    if cart.is_empty() || !fulfilment.charges_delivery() {
        return Money::zero();
    }
    policy.delivery_fee
}

/// subtotal + tax + delivery fee.
pub fn total(cart: &Cart, policy: &PricingPolicy, fulfilment: Fulfilment) -> Money {
    PriceBreakdown::compute(cart, policy, fulfilment).total
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// All four figures for one cart, computed together.
///
/// ## Invariant
/// `total == subtotal + tax + delivery_fee` for every value built by
/// [`PriceBreakdown::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub tax: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

impl PriceBreakdown {
    pub fn compute(cart: &Cart, policy: &PricingPolicy, fulfilment: Fulfilment) -> Self {
        let subtotal = subtotal(cart);
        let tax = subtotal.calculate_tax(policy.tax_rate);
        let delivery_fee = delivery_fee(cart, policy, fulfilment);

        PriceBreakdown {
            subtotal,
            tax,
            delivery_fee,
            total: subtotal + tax + delivery_fee,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
