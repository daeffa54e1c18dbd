use std::sync::Arc;

use agriview_api::models::*;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::services::AutomationSwitch;

#[derive(Clone)]
pub struct SettingState {
    pub switch: Arc<AutomationSwitch>,
}

pub fn setting_router(setting_state: SettingState) -> Router {
    Router::new()
        .route(
            "/api/settings/automation",
            get(get_global_automation).put(set_global_automation),
        )
        .route("/api/settings/automation/toggle", post(toggle_global_automation))
        .with_state(setting_state)
}

#[utoipa::path(
    get,
    path = "/api/settings/automation",
    tag = "setting",
    responses(
        (status = 200, description = "Global automation switch", body = GlobalAutomationResponse)
    )
)]
pub async fn get_global_automation(State(state): State<SettingState>) -> Json<GlobalAutomationResponse> {
    Json(GlobalAutomationResponse {
        enabled: state.switch.is_enabled(),
    })
}

#[utoipa::path(
    put,
    path = "/api/settings/automation",
    tag = "setting",
    request_body = GlobalAutomationRequest,
    responses(
        (status = 200, description = "Global automation switch updated", body = GlobalAutomationResponse)
    )
)]
pub async fn set_global_automation(
    State(state): State<SettingState>,
    Json(body): Json<GlobalAutomationRequest>,
) -> Json<GlobalAutomationResponse> {
    state.switch.set(body.enabled);

    Json(GlobalAutomationResponse {
        enabled: state.switch.is_enabled(),
    })
}

#[utoipa::path(
    post,
    path = "/api/settings/automation/toggle",
    tag = "setting",
    responses(
        (status = 200, description = "Global automation switch flipped", body = GlobalAutomationResponse)
    )
)]
pub async fn toggle_global_automation(State(state): State<SettingState>) -> Json<GlobalAutomationResponse> {
    Json(GlobalAutomationResponse {
        enabled: state.switch.toggle(),
    })
}
