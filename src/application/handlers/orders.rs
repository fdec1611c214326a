//! Order CRUD. Every mutation fans out the order event plus the synthesized
//! activity-log entry, then snapshots the account collection.

use crate::application::validation::OrderPayload;
use crate::application::AppState;
use crate::domain::entities::Order;
use crate::domain::errors::ApiError;
use crate::domain::events::{DeletedOrder, ServerEvent};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub account_id: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Json<Vec<Order>> {
    Json(state.store.list_orders(query.account_id).await)
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<OrderPayload>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let input = payload.into_new()?;
    let (order, log) = state.store.create_order(input).await;
    state.snapshots.accounts(state.store.list_accounts().await);
    state.events.publish(ServerEvent::OrderAdded(order.clone()));
    state.events.publish(ServerEvent::LogAdded(log));
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderPayload>,
) -> Result<Json<Order>, ApiError> {
    let patch = payload.into_patch()?;
    let (order, log) = state
        .store
        .update_order(id, patch)
        .await
        .ok_or(ApiError::NotFound("Order"))?;
    state.snapshots.accounts(state.store.list_accounts().await);
    state.events.publish(ServerEvent::OrderUpdated(order.clone()));
    state.events.publish(ServerEvent::LogAdded(log));
    Ok(Json(order))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let log = state
        .store
        .delete_order(id)
        .await
        .ok_or(ApiError::NotFound("Order"))?;
    state.snapshots.accounts(state.store.list_accounts().await);
    state.events.publish(ServerEvent::OrderDeleted(DeletedOrder { id }));
    state.events.publish(ServerEvent::LogAdded(log));
    Ok(StatusCode::NO_CONTENT)
}
