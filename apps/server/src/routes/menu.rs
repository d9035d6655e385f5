use axum::extract::{Path, State};
use axum::Json;
use bistro_core::MenuItem;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Items currently orderable, grouped by category.
pub async fn list_menu(State(state): State<AppState>) -> ApiResult<Json<Vec<MenuItem>>> {
    let items = state.db.menu().list_available().await?;
    debug!(count = items.len(), "Listed menu");
    Ok(Json(items))
}

/// One item, including sold-out ones so a stale cart line can still be
/// shown with its current state.
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MenuItem>> {
    state
        .db
        .menu()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Menu item", &id.to_string()))
}
