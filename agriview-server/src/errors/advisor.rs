use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("Crop advisor is not configured")]
    NotConfigured,

    #[error("Readings must be finite numbers")]
    InvalidReadings,

    #[error("Failed to get crop suggestion: {0}")]
    Upstream(String),

    #[error("Model returned an unusable answer: {0}")]
    Unparsable(String),
}

impl AdvisorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdvisorError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AdvisorError::InvalidReadings => StatusCode::BAD_REQUEST,
            AdvisorError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AdvisorError::Unparsable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
