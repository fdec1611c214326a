use crate::application::AppState;
use crate::domain::entities::Position;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionListQuery {
    pub account_id: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PositionListQuery>,
) -> Json<Vec<Position>> {
    Json(state.store.list_positions(query.account_id).await)
}
