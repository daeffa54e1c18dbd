use std::sync::Arc;

use agriview_api::models::*;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::errors::{ApiError, DeviceError};
use crate::services::{ControlPanel, EventBus, ServiceEvent};

#[derive(Clone)]
pub struct PanelState {
    pub panel: Arc<ControlPanel>,
    pub events: EventBus,
}

pub fn panel_router(panel_state: PanelState) -> Router {
    Router::new()
        .route("/api/panel", get(get_panel))
        .route("/api/panel/devices/:device", put(set_device_state))
        .route("/api/panel/vent/drag", put(drag_vent))
        .route("/api/panel/vent/commit", put(commit_vent))
        .route("/api/panel/mode", put(set_automation_mode))
        .with_state(panel_state)
}

fn parse_device(device: &str) -> Result<ActuatorDevice, DeviceError> {
    device
        .parse()
        .map_err(|_| DeviceError::UnknownDevice(device.to_string()))
}

fn publish(state: &PanelState, view: PanelView) -> Json<PanelView> {
    state.events.publish(ServiceEvent::Panel(view.clone()));
    Json(view)
}

#[utoipa::path(
    get,
    path = "/api/panel",
    tag = "panel",
    responses(
        (status = 200, description = "Current state of the actuator controls", body = PanelView)
    )
)]
pub async fn get_panel(State(state): State<PanelState>) -> Json<PanelView> {
    Json(state.panel.view().await)
}

#[utoipa::path(
    put,
    path = "/api/panel/devices/{device}",
    tag = "panel",
    params(
        ("device" = ActuatorDevice, Path, description = "pump, valve or fan")
    ),
    request_body = ToggleRequest,
    responses(
        (status = 200, description = "Switch updated", body = PanelView),
        (status = 400, description = "Device is not a switch"),
        (status = 404, description = "Unknown device"),
        (status = 409, description = "Automation active or write already in flight"),
        (status = 502, description = "Remote write failed, switch reverted"),
        (status = 503, description = "No device state received yet")
    )
)]
pub async fn set_device_state(
    State(state): State<PanelState>,
    Path(device): Path<String>,
    Json(body): Json<ToggleRequest>,
) -> Result<Json<PanelView>, ApiError> {
    let device = parse_device(&device)?;
    let view = state.panel.set_toggle(device, body.state).await?;

    Ok(publish(&state, view))
}

#[utoipa::path(
    put,
    path = "/api/panel/vent/drag",
    tag = "panel",
    request_body = VentRequest,
    responses(
        (status = 200, description = "Vent slider is being dragged", body = PanelView),
        (status = 400, description = "Angle outside 0-180"),
        (status = 409, description = "Automation active")
    )
)]
pub async fn drag_vent(
    State(state): State<PanelState>,
    Json(body): Json<VentRequest>,
) -> Result<Json<PanelView>, ApiError> {
    let view = state.panel.drag_vent(body.angle).await?;

    Ok(publish(&state, view))
}

#[utoipa::path(
    put,
    path = "/api/panel/vent/commit",
    tag = "panel",
    request_body = VentRequest,
    responses(
        (status = 200, description = "Vent angle committed", body = PanelView),
        (status = 400, description = "Angle outside 0-180"),
        (status = 409, description = "Automation active or write already in flight"),
        (status = 502, description = "Remote write failed, slider reverted")
    )
)]
pub async fn commit_vent(
    State(state): State<PanelState>,
    Json(body): Json<VentRequest>,
) -> Result<Json<PanelView>, ApiError> {
    let view = state.panel.commit_vent(body.angle).await?;

    Ok(publish(&state, view))
}

#[utoipa::path(
    put,
    path = "/api/panel/mode",
    tag = "panel",
    request_body = AutomationModeRequest,
    responses(
        (status = 200, description = "Panel automation preference updated", body = PanelView),
        (status = 409, description = "Global automation is disabled"),
        (status = 502, description = "Remote write failed")
    )
)]
pub async fn set_automation_mode(
    State(state): State<PanelState>,
    Json(body): Json<AutomationModeRequest>,
) -> Result<Json<PanelView>, ApiError> {
    let view = state.panel.set_local_auto(body.auto).await?;

    Ok(publish(&state, view))
}
