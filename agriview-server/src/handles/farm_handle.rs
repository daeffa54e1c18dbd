use std::sync::Arc;

use agriview_api::models::*;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{ApiError, ChannelError};
use crate::models::ActuatorLog;
use crate::repositories::ActuatorLogRepository;
use crate::services::RemoteChannel;

const DEFAULT_HISTORY_LIMIT: u32 = 50;
const MAX_HISTORY_LIMIT: u32 = 500;

#[derive(Clone)]
pub struct FarmState {
    pub channel: Arc<dyn RemoteChannel>,
    pub actuator_log_repository: Arc<ActuatorLogRepository>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

pub fn farm_router(farm_state: FarmState) -> Router {
    Router::new()
        .route("/api/farm", get(get_farm_data))
        .route("/api/farm/history", get(get_actuator_history))
        .with_state(farm_state)
}

#[utoipa::path(
    get,
    path = "/api/farm",
    tag = "farm",
    responses(
        (status = 200, description = "Latest snapshot of the farm", body = FarmData),
        (status = 503, description = "No snapshot received yet")
    )
)]
pub async fn get_farm_data(State(state): State<FarmState>) -> Result<Json<FarmData>, ApiError> {
    let snapshot = state
        .channel
        .snapshot()
        .await
        .ok_or(ChannelError::Unavailable)?;

    Ok(Json(snapshot))
}

#[utoipa::path(
    get,
    path = "/api/farm/history",
    tag = "farm",
    params(
        ("limit" = Option<u32>, Query, description = "Maximum number of entries, newest first")
    ),
    responses(
        (status = 200, description = "Recent actuator writes", body = Vec<ActuatorLogResponse>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_actuator_history(
    State(state): State<FarmState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ActuatorLogResponse>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);

    let logs = state.actuator_log_repository.find_recent(limit).await?;

    Ok(Json(logs.into_iter().map(to_response).collect()))
}

fn to_response(log: ActuatorLog) -> ActuatorLogResponse {
    let value = serde_json::from_str(&log.value).unwrap_or(Value::String(log.value));

    ActuatorLogResponse {
        id: log.id,
        key: log.key,
        value,
        source: log.source.into(),
        success: log.success,
        time: log.time,
    }
}
