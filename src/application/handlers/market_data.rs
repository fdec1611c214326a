//! Read-only band and quote series. These are fed by the demo generator
//! (or an external system), never mutated over REST.

use crate::application::AppState;
use crate::domain::entities::{BandData, QuoteData};
use crate::domain::errors::ApiError;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub async fn latest_band(State(state): State<AppState>) -> Json<Option<BandData>> {
    Json(state.store.latest_band().await)
}

pub async fn band_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<BandData>> {
    Json(state.store.band_history(query.limit).await)
}

pub async fn latest_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<QuoteData>, ApiError> {
    state
        .store
        .latest_quote(&symbol)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Quote"))
}

pub async fn quote_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<QuoteData>> {
    Json(state.store.quote_history(&symbol, query.limit).await)
}
