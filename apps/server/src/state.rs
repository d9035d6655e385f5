//! Shared router state.

use std::sync::Arc;

use bistro_core::{Catalog, PricingPolicy};
use bistro_db::Database;

/// Handed to every handler through `State<AppState>`.
///
/// Cloned per request; the database pool and the string catalog are shared.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub policy: PricingPolicy,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(db: Database, policy: PricingPolicy, catalog: Catalog) -> Self {
        AppState {
            db,
            policy,
            catalog: Arc::new(catalog),
        }
    }
}
