//! # Cart
//!
//! The ordered list of line items a customer has picked from the menu.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Frontend Action          Cart Method             Cart Change           │
//! │  ───────────────          ───────────             ───────────           │
//! │                                                                         │
//! │  Click "Add" ────────────► add_item() ──────────► qty += n or push     │
//! │                                                                         │
//! │  Change Quantity ────────► update_quantity() ───► qty = n (≤0 removes) │
//! │                                                                         │
//! │  Click Remove ───────────► remove_item() ───────► items.remove(i)      │
//! │                                                                         │
//! │  Checkout OK / Clear ────► clear() ─────────────► items.clear()        │
//! │                                                                         │
//! │  NOTE: the pure cart has no error conditions. Size limits belong to    │
//! │        the caller (see bistro-session's CartStore).                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::MenuItem;

// =============================================================================
// Catalog Item
// =============================================================================

/// What the menu listing hands to the cart when a customer clicks "Add".
///
/// Only the fields the cart snapshots: id, display name and unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    pub price: Money,
}

impl CatalogItem {
    pub fn new(id: i64, name: impl Into<String>, price: Money) -> Self {
        CatalogItem {
            id,
            name: name.into(),
            price,
        }
    }
}

impl From<&MenuItem> for CatalogItem {
    fn from(item: &MenuItem) -> Self {
        CatalogItem::new(item.id, item.name.clone(), item.price())
    }
}

// =============================================================================
// Cart Line Item
// =============================================================================

/// One line in the cart.
///
/// ## Price Freezing
/// `name` and `unit_price` are copied from the catalog when the line is
/// created. Later adds of the same id only bump the quantity; the first
/// snapshot wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLineItem {
    pub item_id: i64,
    pub name: String,
    pub unit_price: Money,
    /// Always ≥ 1 while the line is in a cart.
    pub quantity: u32,
}

impl CartLineItem {
    fn from_catalog(item: &CatalogItem, quantity: u32) -> Self {
        CartLineItem {
            item_id: item.id,
            name: item.name.clone(),
            unit_price: item.price,
            quantity,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `item_id` (adding the same item bumps quantity)
/// - Every line has quantity ≥ 1 (reaching 0 removes the line)
/// - Insertion order is preserved for display
///
/// Serializes as the bare JSON array of its lines, which is exactly what the
/// storage slot holds. Deserializing goes through [`Cart::from_items`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from a loaded list of lines.
    ///
    /// Lines sharing an id are merged into the first occurrence and
    /// zero-quantity lines are dropped, so data written by an older or
    /// buggy client still satisfies the cart invariants.
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        let mut cart = Cart::new();
        for line in items {
            if line.quantity == 0 {
                continue;
            }
            match cart.items.iter_mut().find(|l| l.item_id == line.item_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity)
                }
                None => cart.items.push(line),
            }
        }
        cart
    }

    /// Adds `quantity` of a catalog item.
    ///
    /// ## Behavior
    /// - Item already in cart: increases its quantity
    /// - Item not in cart: appends a new line
    /// - `quantity == 0`: no-op
    pub fn add_item(&mut self, item: &CatalogItem, quantity: u32) {
        if quantity == 0 {
            return;
        }

        if let Some(line) = self.items.iter_mut().find(|l| l.item_id == item.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }

        self.items.push(CartLineItem::from_catalog(item, quantity));
    }

    /// Removes the line for `item_id`.
    ///
    /// Returns `true` if a line was removed; unknown ids are a no-op.
    pub fn remove_item(&mut self, item_id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|l| l.item_id != item_id);
        self.items.len() != before
    }

    /// Sets the quantity of an existing line.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: same as [`Cart::remove_item`]
    /// - item not in cart: no-op (never creates a line)
    ///
    /// Returns `true` if the cart changed.
    pub fn update_quantity(&mut self, item_id: i64, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(item_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.items.iter_mut().find(|l| l.item_id == item_id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    // -------------------------------------------------------------------------
    // Read helpers
    // -------------------------------------------------------------------------

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn get(&self, item_id: i64) -> Option<&CartLineItem> {
        self.items.iter().find(|l| l.item_id == item_id)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all lines (the badge on the cart icon).
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

impl From<Vec<CartLineItem>> for Cart {
    fn from(items: Vec<CartLineItem>) -> Self {
        Cart::from_items(items)
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pizza() -> CatalogItem {
        CatalogItem::new(1, "Margherita", Money::from_cents(999))
    }

    fn salad() -> CatalogItem {
        CatalogItem::new(2, "Caesar Salad", Money::from_cents(550))
    }

    #[test]
    fn test_add_same_item_merges_lines() {
        let mut cart = Cart::new();
        cart.add_item(&pizza(), 1);
        cart.add_item(&pizza(), 2);

        assert_eq!(cart.line_count(), 1);
        let line = cart.get(1).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.line_total().cents(), 2997);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&pizza(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_first_snapshot_wins() {
        let mut cart = Cart::new();
        cart.add_item(&pizza(), 1);
        cart.add_item(&CatalogItem::new(1, "Margherita XL", Money::from_cents(1500)), 1);

        let line = cart.get(1).unwrap();
        assert_eq!(line.name, "Margherita");
        assert_eq!(line.unit_price.cents(), 999);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new();
        cart.add_item(&salad(), 1);
        cart.add_item(&pizza(), 1);
        let ids: Vec<i64> = cart.items().iter().map(|l| l.item_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        cart.add_item(&pizza(), 1);
        assert!(cart.remove_item(1));
        assert!(!cart.remove_item(1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_zero_equals_remove() {
        let mut a = Cart::new();
        a.add_item(&pizza(), 2);
        a.add_item(&salad(), 1);
        let mut b = a.clone();

        a.update_quantity(1, 0);
        b.remove_item(1);
        assert_eq!(a, b);

        a.update_quantity(2, -4);
        assert!(a.is_empty());
    }

    #[test]
    fn test_update_quantity_unknown_item_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&pizza(), 1);
        assert!(!cart.update_quantity(42, 5));
        assert_eq!(cart.line_count(), 1);
        assert!(cart.get(42).is_none());
    }

    #[test]
    fn test_update_quantity_replaces() {
        let mut cart = Cart::new();
        cart.add_item(&pizza(), 3);
        assert!(cart.update_quantity(1, 1));
        assert_eq!(cart.get(1).unwrap().quantity, 1);
        assert_eq!(cart.total_quantity(), 1);
    }

    #[test]
    fn test_from_items_normalises() {
        let line = |id, qty| CartLineItem {
            item_id: id,
            name: format!("item {id}"),
            unit_price: Money::from_cents(100),
            quantity: qty,
        };
        let cart = Cart::from_items(vec![line(1, 2), line(2, 0), line(1, 3)]);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.get(1).unwrap().quantity, 5);
    }

    #[test]
    fn test_json_shape_is_plain_array() {
        let mut cart = Cart::new();
        cart.add_item(&pizza(), 2);

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"itemId": 1, "name": "Margherita", "unitPrice": 999, "quantity": 2}
            ])
        );

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_catalog_item_from_menu_item() {
        let now = chrono::Utc::now();
        let menu = MenuItem {
            id: 7,
            name: "Tiramisu".to_string(),
            description: None,
            category: "Desserts".to_string(),
            price_cents: 650,
            is_available: true,
            created_at: now,
            updated_at: now,
        };
        let item = CatalogItem::from(&menu);
        assert_eq!(item, CatalogItem::new(7, "Tiramisu", Money::from_cents(650)));
    }
}
