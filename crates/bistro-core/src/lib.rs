//! # bistro-core: Pure Business Logic for the Bistro Storefront
//!
//! Cart pricing, order totals and multi-currency display, as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bistro Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │    Menu UI ──► Cart UI ──► Checkout UI ──► Order status UI     │   │
//! │  └───────────────┬─────────────────────────────┬───────────────────┘   │
//! │                  │ bistro-session              │ HTTP                   │
//! │                  │ (cart slot, checkout)       │ (apps/server)          │
//! │  ┌───────────────▼─────────────────────────────▼───────────────────┐   │
//! │  │               ★ bistro-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌────────┐ ┌────────┐ ┌─────────┐ ┌──────────┐ ┌───────┐      │   │
//! │  │  │ money  │ │  cart  │ │ pricing │ │ currency │ │ order │      │   │
//! │  │  └────────┘ └────────┘ └─────────┘ └──────────┘ └───────┘      │   │
//! │  │  ┌────────┐ ┌────────────┐ ┌───────┐                           │   │
//! │  │  │ types  │ │ validation │ │ i18n  │                           │   │
//! │  │  └────────┘ └────────────┘ └───────┘                           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bistro-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Menu items, tax rate, fulfilment, customer info
//! - [`cart`] - Cart line items and cart mutations
//! - [`pricing`] - Subtotal, tax, delivery fee, total
//! - [`currency`] - Exchange rates, conversion and display formatting
//! - [`order`] - Order model, checkout payload, status lifecycle
//! - [`i18n`] - Typed translation catalog with fallback chain
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bistro_core::cart::{Cart, CatalogItem};
//! use bistro_core::money::Money;
//! use bistro_core::pricing::{PriceBreakdown, PricingPolicy};
//! use bistro_core::types::{Fulfilment, TaxRate};
//!
//! let mut cart = Cart::new();
//! cart.add_item(&CatalogItem::new(1, "Margherita", Money::from_cents(1000)), 2);
//! cart.add_item(&CatalogItem::new(2, "Tiramisu", Money::from_cents(550)), 1);
//!
//! let policy = PricingPolicy::new(TaxRate::from_bps(800), Money::from_cents(599));
//! let totals = PriceBreakdown::compute(&cart, &policy, Fulfilment::Delivery);
//!
//! assert_eq!(totals.subtotal.cents(), 2550);
//! assert_eq!(totals.tax.cents(), 204);
//! assert_eq!(totals.total.cents(), 3353);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod currency;
pub mod error;
pub mod i18n;
pub mod money;
pub mod order;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLineItem, CatalogItem};
pub use currency::{Currency, CurrencySettings, ExchangeRate};
pub use error::{CoreError, CoreResult, CurrencyError, ValidationError};
pub use i18n::{Catalog, Locale, MessageKey};
pub use money::Money;
pub use order::{
    CheckoutItem, CheckoutPayload, Order, OrderDetail, OrderItem, OrderReceipt, OrderStatus,
};
pub use pricing::{PriceBreakdown, PricingPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Well-known key of the storage slot holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "bistro.cart";

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 50;

/// Maximum quantity of a single menu item in a cart or order.
///
/// ## Business Reason
/// Keeps a mistyped "100" from landing in the kitchen as a real order.
pub const MAX_ITEM_QUANTITY: i64 = 99;

/// Default tax rate in basis points (8%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 800;

/// Default flat delivery fee in cents ($5.99).
pub const DEFAULT_DELIVERY_FEE_CENTS: i64 = 599;
