use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::Json;
use bistro_core::Locale;
use serde::Serialize;
use tracing::debug;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationsResponse {
    /// The locale actually served.
    pub locale: Locale,
    /// Every message key, already resolved through the fallback chain.
    pub messages: BTreeMap<String, String>,
}

/// Unsupported tags get the default locale's table rather than an error.
pub async fn get_translations(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Json<TranslationsResponse> {
    let locale = Locale::from_tag(&tag).unwrap_or_else(|| {
        debug!(tag = %tag, "Unsupported locale, serving default");
        state.catalog.default_locale()
    });

    Json(TranslationsResponse {
        locale,
        messages: state.catalog.resolved_table(locale),
    })
}
