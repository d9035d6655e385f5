//! # Repository Module
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │  db.orders().create(&new_order)                                │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── create(&self, order)          (order + items in one transaction)  │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list(&self, filter)                                               │
//! │  └── update_status(&self, id, status)                                  │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`menu::MenuRepository`] - Menu listing and lookup
//! - [`currency::CurrencyRepository`] - Currency settings
//! - [`order::OrderRepository`] - Orders, order items, status changes

pub mod currency;
pub mod menu;
pub mod order;
