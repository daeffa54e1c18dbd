use axum::http::StatusCode;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ChannelError {
    #[error("Farm data is not available yet")]
    Unavailable,

    #[error("Write timed out")]
    Timeout,

    #[error("Write rejected: {0}")]
    Rejected(String),
}

impl ChannelError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChannelError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ChannelError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ChannelError::Rejected(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
