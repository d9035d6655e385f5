//! # Bistro Server
//!
//! REST backend for the storefront.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Bistro Server                                  │
//! │                                                                         │
//! │  Storefront ───► HTTP (8080) ───► TraceLayer ───► routes ───► SQLite    │
//! │                                     CorsLayer       │                   │
//! │                                                     ▼                   │
//! │                                   bistro-core (pricing, validation)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Environment configuration
//! - [`error`] - `ApiError` and its HTTP mapping
//! - [`routes`] - Handlers
//! - [`state`] - Shared router state

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Builds the application router with tracing and CORS middleware.
pub fn build_router(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn default_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

const DEFAULT_FILTER: &str = "info,bistro=debug,sqlx=warn";

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_default_filter_levels() {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(default_filter())
            .with_target(true)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            assert!(!tracing::enabled!(target: "sqlx::query", Level::DEBUG));
            assert!(!tracing::enabled!(target: "sqlx::query", Level::INFO));
            assert!(tracing::enabled!(target: "sqlx::query", Level::WARN));
            assert!(tracing::enabled!(target: "bistro_server::routes", Level::DEBUG));
            assert!(!tracing::enabled!(target: "bistro_server::routes", Level::TRACE));
            assert!(tracing::enabled!(target: "tower_http::trace", Level::INFO));
            assert!(!tracing::enabled!(target: "tower_http::trace", Level::DEBUG));
        });
    }
}
