//! # HTTP Routes
//!
//! ```text
//! GET    /health                      liveness + database check
//! GET    /api/menu                    available menu items
//! GET    /api/menu/{id}               one menu item
//! GET    /api/currencies              currency settings
//! GET    /api/translations/{locale}   resolved string table
//! POST   /api/orders                  place an order from a checkout payload
//! GET    /api/orders                  recent orders (?status=&limit=)
//! GET    /api/orders/{id}             order with its lines
//! PATCH  /api/orders/{id}/status      staff status change
//! ```

pub mod currencies;
pub mod health;
pub mod menu;
pub mod orders;
pub mod translations;

use axum::routing::{get, patch};
use axum::Router;

use crate::state::AppState;

/// All routes, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/menu", get(menu::list_menu))
        .route("/api/menu/{id}", get(menu::get_menu_item))
        .route("/api/currencies", get(currencies::list_currencies))
        .route("/api/translations/{locale}", get(translations::get_translations))
        .route("/api/orders", get(orders::list_orders).post(orders::create_order))
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/orders/{id}/status", patch(orders::update_order_status))
}

// =============================================================================
// Route Tests
// =============================================================================
