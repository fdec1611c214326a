use crate::application::validation::{parse_setting_type, SettingPayload};
use crate::application::AppState;
use crate::domain::errors::ApiError;
use crate::domain::events::ServerEvent;
use axum::extract::{Path, State};
use axum::Json;

pub async fn get(
    State(state): State<AppState>,
    Path(raw_type): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let setting_type = parse_setting_type(&raw_type)?;
    let setting = state
        .store
        .setting(setting_type)
        .await
        .ok_or(ApiError::NotFound("Setting"))?;
    Ok(Json(setting.data))
}

pub async fn upsert(
    State(state): State<AppState>,
    Path(raw_type): Path<String>,
    Json(payload): Json<SettingPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let setting_type = parse_setting_type(&raw_type)?;
    let data = payload.into_data(setting_type)?;
    let setting = state.store.upsert_setting(setting_type, data).await;
    state.snapshots.inputs(state.store.settings_snapshot().await);
    state.events.publish(ServerEvent::SettingUpdated(setting.clone()));
    Ok(Json(setting.data))
}
