use axum::extract::State;
use axum::Json;
use bistro_core::CurrencySettings;
use bistro_db::{Database, DbResult};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

/// Currency settings, or base-currency-only when none are configured yet.
pub(crate) async fn load_settings(db: &Database) -> DbResult<CurrencySettings> {
    let repo = db.currencies();
    if repo.list().await?.is_empty() {
        debug!("No currencies configured, serving base currency only");
        return Ok(CurrencySettings::base_only());
    }
    repo.settings().await
}

pub async fn list_currencies(State(state): State<AppState>) -> ApiResult<Json<CurrencySettings>> {
    Ok(Json(load_settings(&state.db).await?))
}
