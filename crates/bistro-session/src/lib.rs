//! # bistro-session: Customer Session State
//!
//! The cart store a storefront session works against, the storage slot it
//! persists into, and the checkout client that turns the cart into an order.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use bistro_core::{CatalogItem, Money};
//! use bistro_session::{CartStore, MemoryStorage};
//!
//! let store = CartStore::load(Arc::new(MemoryStorage::new()));
//! store.add_item(&CatalogItem::new(1, "Margherita", Money::from_cents(1000)), 2).unwrap();
//! assert_eq!(store.get().unwrap().total_quantity(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`storage`] - `StorageSlot` trait with memory and file backends
//! - [`cart_store`] - Persisted, observable cart
//! - [`checkout`] - Checkout submission
//! - [`gateway`] - `OrderGateway` trait and its HTTP implementation
//! - [`error`] - Session, gateway and checkout errors

pub mod cart_store;
pub mod checkout;
pub mod error;
pub mod gateway;
pub mod storage;

pub use cart_store::{CartChange, CartEvent, CartStore};
pub use checkout::Checkout;
pub use error::{CheckoutError, GatewayError, SessionError, SessionResult};
pub use gateway::{HttpOrderGateway, OrderGateway};
pub use storage::{FileStorage, MemoryStorage, SlotChange, StorageSlot};
