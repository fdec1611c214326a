//! Account CRUD.
//!
//! Account mutations snapshot the full collection to `accounts.json` but do
//! not broadcast; viewers refetch accounts over REST (see DESIGN.md).

use crate::application::validation::AccountPayload;
use crate::application::AppState;
use crate::domain::entities::Account;
use crate::domain::errors::ApiError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

pub async fn list(State(state): State<AppState>) -> Json<Vec<Account>> {
    Json(state.store.list_accounts().await)
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<AccountPayload>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    let input = payload.into_new()?;
    let account = state.store.create_account(input).await;
    state.snapshots.accounts(state.store.list_accounts().await);
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AccountPayload>,
) -> Result<Json<Account>, ApiError> {
    let patch = payload.into_patch()?;
    let account = state
        .store
        .update_account(id, patch)
        .await
        .ok_or(ApiError::NotFound("Account"))?;
    state.snapshots.accounts(state.store.list_accounts().await);
    Ok(Json(account))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete_account(id).await {
        return Err(ApiError::NotFound("Account"));
    }
    state.snapshots.accounts(state.store.list_accounts().await);
    Ok(StatusCode::NO_CONTENT)
}
