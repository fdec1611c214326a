use crate::application::validation::LogPayload;
use crate::application::AppState;
use crate::domain::entities::LogEntry;
use crate::domain::errors::ApiError;
use crate::domain::events::ServerEvent;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LogListQuery {
    pub limit: Option<usize>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LogListQuery>,
) -> Json<Vec<LogEntry>> {
    Json(state.store.list_logs(query.limit).await)
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<LogPayload>,
) -> Result<(StatusCode, Json<LogEntry>), ApiError> {
    let (level, message) = payload.into_new()?;
    let entry = state.store.append_log(level, message).await;
    state.events.publish(ServerEvent::LogAdded(entry.clone()));
    Ok((StatusCode::CREATED, Json(entry)))
}
