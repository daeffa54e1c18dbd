use super::{AdvisorError, ChannelError, DeviceError, RuleError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Advisor error: {0}")]
    AdvisorError(#[from] AdvisorError),

    #[error("Channel error: {0}")]
    ChannelError(#[from] ChannelError),

    #[error("Device error: {0}")]
    DeviceError(#[from] DeviceError),

    #[error("Rule error: {0}")]
    RuleError(#[from] RuleError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
