use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Unknown sensor type: {0}")]
    UnknownSensor(String),

    #[error("Vent angle {0} is outside 0-180")]
    InvalidAngle(u8),

    #[error("Threshold must be a finite number")]
    InvalidThreshold,
}

impl RuleError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RuleError::UnknownSensor(_) => StatusCode::NOT_FOUND,
            RuleError::InvalidAngle(_) => StatusCode::BAD_REQUEST,
            RuleError::InvalidThreshold => StatusCode::BAD_REQUEST,
        }
    }
}
