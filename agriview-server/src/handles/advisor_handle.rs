use std::sync::Arc;

use agriview_api::models::*;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::errors::ApiError;
use crate::services::AdvisorService;

#[derive(Clone)]
pub struct AdvisorState {
    pub advisor_service: Arc<AdvisorService>,
}

pub fn advisor_router(advisor_state: AdvisorState) -> Router {
    Router::new()
        .route("/api/advisor/crop", post(suggest_crop))
        .with_state(advisor_state)
}

#[utoipa::path(
    post,
    path = "/api/advisor/crop",
    tag = "advisor",
    request_body = CropSuggestionRequest,
    responses(
        (status = 200, description = "Suggested crop with justification", body = CropSuggestion),
        (status = 400, description = "Readings are not finite numbers"),
        (status = 502, description = "Model failed or returned an unusable answer"),
        (status = 503, description = "Advisor not configured")
    )
)]
pub async fn suggest_crop(
    State(state): State<AdvisorState>,
    Json(body): Json<CropSuggestionRequest>,
) -> Result<Json<CropSuggestion>, ApiError> {
    let suggestion = state.advisor_service.suggest_crop(&body).await?;

    Ok(Json(suggestion))
}
