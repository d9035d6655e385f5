//! # Cart Store
//!
//! The session-side owner of the cart: every mutation is persisted to the
//! storage slot and announced to subscribers.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_item / remove_item / update_quantity / clear                       │
//! │       │                                                                 │
//! │       ├── 1. check limits (quantity ≤ 99, lines ≤ 50)                   │
//! │       ├── 2. apply to a copy of the cart                                │
//! │       ├── 3. unchanged? stop here (no write, no event)                  │
//! │       ├── 4. write JSON to "bistro.cart" (remove the slot if empty)     │
//! │       ├── 5. swap the copy in                                           │
//! │       └── 6. send exactly one CartEvent                                 │
//! │                                                                         │
//! │  A failed write leaves the in-memory cart as it was.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The cart sits behind a `Mutex` held for the whole mutation, so writes
//! from one store are serialized. Separate stores sharing a slot converge
//! last-write-wins through [`CartStore::sync_from_storage`], which reads the
//! slot under the same lock so a concurrent mutation cannot be overwritten
//! with an older snapshot.

use std::sync::{Arc, Mutex, MutexGuard};

use bistro_core::pricing::{PriceBreakdown, PricingPolicy};
use bistro_core::validation::{validate_cart_size, validate_quantity};
use bistro_core::{Cart, CartLineItem, CatalogItem, Fulfilment, CART_STORAGE_KEY};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{SessionError, SessionResult};
use crate::storage::{StorageSlot, WriterId};

const EVENT_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// Events
// =============================================================================

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    ItemAdded { item_id: i64, quantity: u32 },
    ItemRemoved { item_id: i64 },
    QuantityUpdated { item_id: i64, quantity: u32 },
    Cleared,
    /// Ordered lines taken out after checkout; lines added meanwhile stay.
    Ordered { item_ids: Vec<i64> },
    /// Replaced by a newer cart written by another session.
    Synced,
}

/// Sent to subscribers after every effective mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEvent {
    pub change: CartChange,
    /// The cart after the change.
    pub cart: Cart,
}

// =============================================================================
// Cart Store
// =============================================================================

pub struct CartStore {
    storage: Arc<dyn StorageSlot>,
    cart: Mutex<Cart>,
    events: broadcast::Sender<CartEvent>,
    writer_id: WriterId,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("writer_id", &self.writer_id)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Creates a store and loads whatever cart the slot holds.
    ///
    /// ## Load Rules
    /// - Missing slot: empty cart
    /// - Unparseable JSON: empty cart, logged at `warn`
    /// - Storage read failure: empty cart, logged at `warn`
    pub fn load(storage: Arc<dyn StorageSlot>) -> Self {
        let cart = read_cart(storage.as_ref());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let writer_id = Uuid::new_v4();

        debug!(writer_id = %writer_id, lines = cart.line_count(), "Cart store loaded");

        CartStore {
            storage,
            cart: Mutex::new(cart),
            events,
            writer_id,
        }
    }

    pub fn writer_id(&self) -> WriterId {
        self.writer_id
    }

    /// Current cart snapshot.
    pub fn get(&self) -> SessionResult<Cart> {
        Ok(self.lock()?.clone())
    }

    /// Current totals for the cart.
    pub fn totals(
        &self,
        policy: &PricingPolicy,
        fulfilment: Fulfilment,
    ) -> SessionResult<PriceBreakdown> {
        let cart = self.lock()?;
        Ok(PriceBreakdown::compute(&cart, policy, fulfilment))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Adds `quantity` of an item. Zero is a no-op.
    ///
    /// ## Errors
    /// - resulting line quantity above 99
    /// - a new line when the cart already has 50
    pub fn add_item(&self, item: &CatalogItem, quantity: u32) -> SessionResult<Cart> {
        if quantity == 0 {
            return self.get();
        }

        self.mutate(|cart| {
            let existing = cart.get(item.id).map_or(0, |l| i64::from(l.quantity));
            validate_quantity(existing + i64::from(quantity))?;
            if existing == 0 {
                validate_cart_size(cart.line_count() + 1)?;
            }

            cart.add_item(item, quantity);
            Ok(Some(CartChange::ItemAdded {
                item_id: item.id,
                quantity,
            }))
        })
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove_item(&self, item_id: i64) -> SessionResult<bool> {
        let mut removed = false;
        self.mutate(|cart| {
            removed = cart.remove_item(item_id);
            Ok(removed.then_some(CartChange::ItemRemoved { item_id }))
        })?;
        Ok(removed)
    }

    /// Sets a line's quantity; `≤ 0` removes it. Unknown ids are a no-op.
    pub fn update_quantity(&self, item_id: i64, quantity: i64) -> SessionResult<bool> {
        if quantity > 0 {
            validate_quantity(quantity)?;
        }

        let mut changed = false;
        self.mutate(|cart| {
            changed = cart.update_quantity(item_id, quantity);
            if !changed {
                return Ok(None);
            }
            Ok(Some(match cart.get(item_id) {
                Some(line) => CartChange::QuantityUpdated {
                    item_id,
                    quantity: line.quantity,
                },
                None => CartChange::ItemRemoved { item_id },
            }))
        })?;
        Ok(changed)
    }

    /// Empties the cart and removes the slot.
    pub fn clear(&self) -> SessionResult<()> {
        self.mutate(|cart| {
            if cart.is_empty() {
                return Ok(None);
            }
            cart.clear();
            Ok(Some(CartChange::Cleared))
        })?;
        Ok(())
    }

    /// Takes submitted lines out of the cart after a successful checkout.
    ///
    /// Each `(item_id, quantity)` is subtracted from its line; a line whose
    /// quantity drops to zero is removed. Quantity added after the order was
    /// snapshotted is kept. Emits `Cleared` if nothing is left, otherwise one
    /// `Ordered` event.
    pub fn remove_ordered(&self, ordered: &[(i64, u32)]) -> SessionResult<Cart> {
        self.mutate(|cart| {
            let mut item_ids = Vec::new();
            for &(item_id, quantity) in ordered {
                let Some(current) = cart.get(item_id).map(|l| i64::from(l.quantity)) else {
                    continue;
                };
                if cart.update_quantity(item_id, current - i64::from(quantity)) {
                    item_ids.push(item_id);
                }
            }

            if item_ids.is_empty() {
                Ok(None)
            } else if cart.is_empty() {
                Ok(Some(CartChange::Cleared))
            } else {
                Ok(Some(CartChange::Ordered { item_ids }))
            }
        })
    }

    /// Re-reads the slot and adopts its cart if it differs.
    ///
    /// Returns `true` if the in-memory cart was replaced.
    pub fn sync_from_storage(&self) -> SessionResult<bool> {
        let mut cart = self.lock()?;
        let stored = read_cart(self.storage.as_ref());
        if *cart == stored {
            return Ok(false);
        }

        debug!(writer_id = %self.writer_id, lines = stored.line_count(), "Adopting cart from storage");
        *cart = stored.clone();
        drop(cart);

        self.emit(CartChange::Synced, stored);
        Ok(true)
    }

    /// Spawns a task that syncs whenever another session writes the cart
    /// slot. The task ends when the storage channel closes.
    pub fn spawn_sync(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut changes = store.storage.subscribe();

        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        if change.key != CART_STORAGE_KEY || change.origin == store.writer_id {
                            continue;
                        }
                        if let Err(e) = store.sync_from_storage() {
                            warn!(error = %e, "Cart sync failed");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Cart sync lagged, resyncing");
                        if let Err(e) = store.sync_from_storage() {
                            warn!(error = %e, "Cart sync failed");
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn lock(&self) -> SessionResult<MutexGuard<'_, Cart>> {
        self.cart.lock().map_err(|_| SessionError::LockPoisoned)
    }

    /// Runs `f` on a copy, persists it if `f` reports a change, then commits.
    fn mutate<F>(&self, f: F) -> SessionResult<Cart>
    where
        F: FnOnce(&mut Cart) -> SessionResult<Option<CartChange>>,
    {
        let mut cart = self.lock()?;
        let mut next = cart.clone();

        let Some(change) = f(&mut next)? else {
            return Ok(next);
        };

        if next.is_empty() {
            self.storage.remove(CART_STORAGE_KEY, self.writer_id)?;
        } else {
            let json = serde_json::to_string(next.items())?;
            self.storage.write(CART_STORAGE_KEY, &json, self.writer_id)?;
        }

        *cart = next.clone();
        drop(cart);

        debug!(?change, lines = next.line_count(), "Cart updated");
        self.emit(change, next.clone());
        Ok(next)
    }

    fn emit(&self, change: CartChange, cart: Cart) {
        // No subscribers is fine
        let _ = self.events.send(CartEvent { change, cart });
    }
}

/// Reads and parses the cart slot, falling back to an empty cart.
fn read_cart(storage: &dyn StorageSlot) -> Cart {
    let raw = match storage.read(CART_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, "Could not read stored cart, starting empty");
            return Cart::new();
        }
    };

    match serde_json::from_str::<Vec<CartLineItem>>(&raw) {
        Ok(items) => Cart::from_items(items),
        Err(e) => {
            warn!(error = %e, "Stored cart is corrupted, starting empty");
            Cart::new()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
