use std::sync::Arc;

use agriview_api::models::*;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::errors::{ApiError, RuleError};
use crate::services::RuleStore;

#[derive(Clone)]
pub struct RuleState {
    pub rule_store: Arc<RuleStore>,
}

pub fn rule_router(rule_state: RuleState) -> Router {
    Router::new()
        .route("/api/rules", get(get_rules).put(replace_rules))
        .route("/api/rules/:sensor", get(get_rule).patch(update_rule))
        .with_state(rule_state)
}

fn parse_sensor(sensor: &str) -> Result<SensorType, RuleError> {
    sensor
        .parse()
        .map_err(|_| RuleError::UnknownSensor(sensor.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/rules",
    tag = "rule",
    responses(
        (status = 200, description = "Automation rules of every sensor", body = AutomationRulesState)
    )
)]
pub async fn get_rules(State(state): State<RuleState>) -> Json<AutomationRulesState> {
    Json(state.rule_store.rules())
}

#[utoipa::path(
    put,
    path = "/api/rules",
    tag = "rule",
    request_body = AutomationRulesState,
    responses(
        (status = 200, description = "Rules replaced and saved", body = AutomationRulesState),
        (status = 400, description = "Invalid threshold or vent angle")
    )
)]
pub async fn replace_rules(
    State(state): State<RuleState>,
    Json(body): Json<AutomationRulesState>,
) -> Result<Json<AutomationRulesState>, ApiError> {
    let rules = state.rule_store.replace(body).await?;

    Ok(Json(rules))
}

#[utoipa::path(
    get,
    path = "/api/rules/{sensor}",
    tag = "rule",
    params(
        ("sensor" = SensorType, Path, description = "Sensor type")
    ),
    responses(
        (status = 200, description = "Automation rule of the sensor", body = SensorAutomationRule),
        (status = 404, description = "Unknown sensor type")
    )
)]
pub async fn get_rule(
    State(state): State<RuleState>,
    Path(sensor): Path<String>,
) -> Result<Json<SensorAutomationRule>, ApiError> {
    let sensor = parse_sensor(&sensor)?;

    Ok(Json(state.rule_store.rule(sensor)))
}

#[utoipa::path(
    patch,
    path = "/api/rules/{sensor}",
    tag = "rule",
    params(
        ("sensor" = SensorType, Path, description = "Sensor type")
    ),
    request_body = RulePatch,
    responses(
        (status = 200, description = "Rule updated and saved", body = SensorAutomationRule),
        (status = 400, description = "Invalid threshold or vent angle"),
        (status = 404, description = "Unknown sensor type")
    )
)]
pub async fn update_rule(
    State(state): State<RuleState>,
    Path(sensor): Path<String>,
    Json(body): Json<RulePatch>,
) -> Result<Json<SensorAutomationRule>, ApiError> {
    let sensor = parse_sensor(&sensor)?;
    let rule = state.rule_store.update(sensor, body).await?;

    Ok(Json(rule))
}
