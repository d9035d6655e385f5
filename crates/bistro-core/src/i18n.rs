//! # Translations
//!
//! Typed UI string tables keyed by [`Locale`] and [`MessageKey`].
//!
//! ## Lookup Chain
//! ```text
//! translate(Fr, CartEmpty)
//!     │
//!     ├─► fr table has it? ──► "Votre panier est vide"
//!     │
//!     ├─► en table has it? ──► "Your cart is empty"
//!     │
//!     └─► raw key ───────────► "cart.empty"
//! ```
//!
//! English is complete; the other tables may be partial and fall through.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Locale
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Locale {
    #[default]
    En,
    Es,
    Fr,
    De,
}

/// How a locale writes numbers and where the currency symbol goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberConventions {
    pub decimal_separator: &'static str,
    pub group_separator: &'static str,
    pub symbol_after: bool,
}

impl Locale {
    pub const ALL: [Locale; 4] = [Locale::En, Locale::Es, Locale::Fr, Locale::De];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::Fr => "fr",
            Locale::De => "de",
        }
    }

    /// Parses a language tag by its primary subtag (`"fr-CA"` → `Fr`).
    ///
    /// Returns `None` for languages without a table.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?.trim().to_ascii_lowercase();
        Locale::ALL.into_iter().find(|l| l.as_str() == primary)
    }

    pub const fn number_conventions(&self) -> NumberConventions {
        match self {
            Locale::En => NumberConventions {
                decimal_separator: ".",
                group_separator: ",",
                symbol_after: false,
            },
            Locale::Es | Locale::De => NumberConventions {
                decimal_separator: ",",
                group_separator: ".",
                symbol_after: true,
            },
            Locale::Fr => NumberConventions {
                decimal_separator: ",",
                group_separator: " ",
                symbol_after: true,
            },
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| format!("unsupported locale: {s}"))
    }
}

// =============================================================================
// Message Keys
// =============================================================================

macro_rules! message_keys {
    ($($variant:ident => $key:literal),+ $(,)?) => {
        /// Every UI string the storefront renders.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
        #[ts(export)]
        pub enum MessageKey {
            $(
                #[serde(rename = $key)]
                $variant,
            )+
        }

        impl MessageKey {
            pub const ALL: &'static [MessageKey] = &[$(MessageKey::$variant),+];

            /// Dotted key used in JSON tables and as the last-resort text.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(MessageKey::$variant => $key,)+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key => Some(MessageKey::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

message_keys! {
    NavMenu => "nav.menu",
    NavCart => "nav.cart",
    NavOrders => "nav.orders",
    MenuAddToCart => "menu.add_to_cart",
    MenuUnavailable => "menu.unavailable",
    CartTitle => "cart.title",
    CartEmpty => "cart.empty",
    CartRemove => "cart.remove",
    CartClear => "cart.clear",
    CartQuantity => "cart.quantity",
    CartSubtotal => "cart.subtotal",
    CartTax => "cart.tax",
    CartDeliveryFee => "cart.delivery_fee",
    CartTotal => "cart.total",
    CheckoutTitle => "checkout.title",
    CheckoutSubmit => "checkout.submit",
    CheckoutSuccess => "checkout.success",
    CheckoutFailed => "checkout.failed",
    FulfilmentDelivery => "fulfilment.delivery",
    FulfilmentPickup => "fulfilment.pickup",
    FulfilmentDineIn => "fulfilment.dine_in",
    FieldName => "field.name",
    FieldPhone => "field.phone",
    FieldEmail => "field.email",
    FieldAddress => "field.address",
    FieldNotes => "field.notes",
    StatusPending => "status.pending",
    StatusPreparing => "status.preparing",
    StatusReady => "status.ready",
    StatusDelivered => "status.delivered",
    StatusCancelled => "status.cancelled",
    CurrencyLabel => "settings.currency",
    LanguageLabel => "settings.language",
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Built-in Tables
// =============================================================================

fn builtin(locale: Locale) -> &'static [(MessageKey, &'static str)] {
    use MessageKey::*;
    match locale {
        Locale::En => &[
            (NavMenu, "Menu"),
            (NavCart, "Cart"),
            (NavOrders, "Orders"),
            (MenuAddToCart, "Add to cart"),
            (MenuUnavailable, "Currently unavailable"),
            (CartTitle, "Your cart"),
            (CartEmpty, "Your cart is empty"),
            (CartRemove, "Remove"),
            (CartClear, "Clear cart"),
            (CartQuantity, "Quantity"),
            (CartSubtotal, "Subtotal"),
            (CartTax, "Tax"),
            (CartDeliveryFee, "Delivery fee"),
            (CartTotal, "Total"),
            (CheckoutTitle, "Checkout"),
            (CheckoutSubmit, "Place order"),
            (CheckoutSuccess, "Thank you! Your order has been placed."),
            (CheckoutFailed, "We could not place your order. Please try again."),
            (FulfilmentDelivery, "Delivery"),
            (FulfilmentPickup, "Pickup"),
            (FulfilmentDineIn, "Dine in"),
            (FieldName, "Name"),
            (FieldPhone, "Phone"),
            (FieldEmail, "Email"),
            (FieldAddress, "Delivery address"),
            (FieldNotes, "Notes for the kitchen"),
            (StatusPending, "Pending"),
            (StatusPreparing, "Preparing"),
            (StatusReady, "Ready"),
            (StatusDelivered, "Delivered"),
            (StatusCancelled, "Cancelled"),
            (CurrencyLabel, "Currency"),
            (LanguageLabel, "Language"),
        ],
        Locale::Es => &[
            (NavMenu, "Menú"),
            (NavCart, "Carrito"),
            (NavOrders, "Pedidos"),
            (MenuAddToCart, "Añadir al carrito"),
            (CartTitle, "Tu carrito"),
            (CartEmpty, "Tu carrito está vacío"),
            (CartRemove, "Eliminar"),
            (CartSubtotal, "Subtotal"),
            (CartTax, "Impuestos"),
            (CartDeliveryFee, "Gastos de envío"),
            (CartTotal, "Total"),
            (CheckoutSubmit, "Realizar pedido"),
            (CheckoutSuccess, "¡Gracias! Tu pedido ha sido realizado."),
            (FulfilmentDelivery, "A domicilio"),
            (FulfilmentPickup, "Para recoger"),
            (StatusPending, "Pendiente"),
            (StatusDelivered, "Entregado"),
        ],
        Locale::Fr => &[
            (NavMenu, "Carte"),
            (NavCart, "Panier"),
            (MenuAddToCart, "Ajouter au panier"),
            (CartTitle, "Votre panier"),
            (CartEmpty, "Votre panier est vide"),
            (CartSubtotal, "Sous-total"),
            (CartTax, "TVA"),
            (CartDeliveryFee, "Frais de livraison"),
            (CartTotal, "Total"),
            (CheckoutSubmit, "Commander"),
            (FulfilmentDelivery, "Livraison"),
            (FulfilmentPickup, "À emporter"),
            (FulfilmentDineIn, "Sur place"),
            (StatusPreparing, "En préparation"),
        ],
        Locale::De => &[
            (NavMenu, "Speisekarte"),
            (NavCart, "Warenkorb"),
            (MenuAddToCart, "In den Warenkorb"),
            (CartEmpty, "Ihr Warenkorb ist leer"),
            (CartSubtotal, "Zwischensumme"),
            (CartTax, "MwSt."),
            (CartDeliveryFee, "Liefergebühr"),
            (CartTotal, "Gesamt"),
            (CheckoutSubmit, "Bestellen"),
            (FulfilmentDelivery, "Lieferung"),
            (FulfilmentPickup, "Abholung"),
        ],
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Locale → key → text.
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: HashMap<Locale, HashMap<MessageKey, String>>,
    default_locale: Locale,
}

impl Catalog {
    /// Catalog holding the built-in tables with English as the fallback.
    pub fn builtin() -> Self {
        let tables = Locale::ALL
            .into_iter()
            .map(|locale| {
                let table = builtin(locale)
                    .iter()
                    .map(|(k, v)| (*k, (*v).to_string()))
                    .collect();
                (locale, table)
            })
            .collect();

        Catalog {
            tables,
            default_locale: Locale::En,
        }
    }

    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    /// Requested locale, then the default locale, then the raw key.
    pub fn translate(&self, locale: Locale, key: MessageKey) -> &str {
        self.lookup(locale, key)
            .or_else(|| self.lookup(self.default_locale, key))
            .unwrap_or(key.as_str())
    }

    fn lookup(&self, locale: Locale, key: MessageKey) -> Option<&str> {
        self.tables
            .get(&locale)
            .and_then(|t| t.get(&key))
            .map(String::as_str)
    }

    /// Every key resolved through the fallback chain, keyed by dotted name.
    ///
    /// This is what the frontend downloads for a locale.
    pub fn resolved_table(&self, locale: Locale) -> std::collections::BTreeMap<String, String> {
        MessageKey::ALL
            .iter()
            .map(|k| (k.as_str().to_string(), self.translate(locale, *k).to_string()))
            .collect()
    }

    /// Merges overrides from a JSON object of `{ "dotted.key": "text" }`.
    ///
    /// Unknown keys are returned so the caller can report them; known keys
    /// replace the built-in text.
    pub fn merge_json(&mut self, locale: Locale, json: &str) -> serde_json::Result<Vec<String>> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        let table = self.tables.entry(locale).or_default();

        let mut unknown = Vec::new();
        for (key, text) in raw {
            match MessageKey::from_key(&key) {
                Some(k) => {
                    table.insert(k, text);
                }
                None => unknown.push(key),
            }
        }
        unknown.sort();
        Ok(unknown)
    }

    /// Keys missing from a locale's own table (before fallback).
    pub fn missing_keys(&self, locale: Locale) -> Vec<MessageKey> {
        MessageKey::ALL
            .iter()
            .copied()
            .filter(|k| self.lookup(locale, *k).is_none())
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_is_complete() {
        let catalog = Catalog::builtin();
        assert!(catalog.missing_keys(Locale::En).is_empty());
    }

    #[test]
    fn test_requested_locale_wins() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.translate(Locale::Fr, MessageKey::CartEmpty), "Votre panier est vide");
    }

    #[test]
    fn test_falls_back_to_default_locale() {
        let catalog = Catalog::builtin();
        assert!(catalog.missing_keys(Locale::De).contains(&MessageKey::CartClear));
        assert_eq!(catalog.translate(Locale::De, MessageKey::CartClear), "Clear cart");
    }

    #[test]
    fn test_falls_back_to_raw_key() {
        let mut catalog = Catalog::builtin();
        catalog.tables.clear();
        assert_eq!(catalog.translate(Locale::Es, MessageKey::CartTotal), "cart.total");
    }

    #[test]
    fn test_locale_from_tag() {
        assert_eq!(Locale::from_tag("fr-CA"), Some(Locale::Fr));
        assert_eq!(Locale::from_tag("DE_at"), Some(Locale::De));
        assert_eq!(Locale::from_tag("en"), Some(Locale::En));
        assert_eq!(Locale::from_tag("ja-JP"), None);
        assert_eq!("es".parse::<Locale>(), Ok(Locale::Es));
    }

    #[test]
    fn test_message_key_names_round_trip() {
        for key in MessageKey::ALL {
            assert_eq!(MessageKey::from_key(key.as_str()), Some(*key));
            let json = serde_json::to_string(key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
    }

    #[test]
    fn test_merge_json_overrides() {
        let mut catalog = Catalog::builtin();
        let unknown = catalog
            .merge_json(Locale::De, r#"{"cart.clear": "Leeren", "bogus.key": "x"}"#)
            .unwrap();

        assert_eq!(unknown, vec!["bogus.key".to_string()]);
        assert_eq!(catalog.translate(Locale::De, MessageKey::CartClear), "Leeren");
    }

    #[test]
    fn test_resolved_table_covers_every_key() {
        let table = Catalog::builtin().resolved_table(Locale::Es);
        assert_eq!(table.len(), MessageKey::ALL.len());
        assert_eq!(table["cart.title"], "Tu carrito");
        assert_eq!(table["cart.clear"], "Clear cart");
    }
}
