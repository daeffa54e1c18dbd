use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Device is not a switch")]
    NotASwitch,

    #[error("Vent angle {0} is outside 0-180")]
    InvalidAngle(u16),

    #[error("Device state has not been received yet")]
    NotLoaded,

    #[error("Controls are locked while automation is active")]
    AutomationActive,

    #[error("Global automation is disabled")]
    GlobalAutomationDisabled,

    #[error("A write to {0} is already in flight")]
    WriteInFlight(&'static str),

    #[error("Could not update {key}: {reason}")]
    WriteFailed { key: &'static str, reason: String },
}

impl DeviceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeviceError::UnknownDevice(_) => StatusCode::NOT_FOUND,
            DeviceError::NotASwitch => StatusCode::BAD_REQUEST,
            DeviceError::InvalidAngle(_) => StatusCode::BAD_REQUEST,
            DeviceError::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            DeviceError::AutomationActive => StatusCode::CONFLICT,
            DeviceError::GlobalAutomationDisabled => StatusCode::CONFLICT,
            DeviceError::WriteInFlight(_) => StatusCode::CONFLICT,
            DeviceError::WriteFailed { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}
