use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use super::{ActuatorDevice, Bound, DeviceSettings, SensorType};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleRequest {
    /// `true` switches on (or opens the valve)
    pub state: bool,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VentRequest {
    /// Vent opening in degrees (0-180)
    pub angle: u16,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationModeRequest {
    /// Panel-local automation preference
    pub auto: bool,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalAutomationRequest {
    pub enabled: bool,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalAutomationResponse {
    pub enabled: bool,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VentPhase {
    /// Showing the remote value
    Idle,
    /// User input in progress, not sent yet
    Dragging,
    /// Sent, waiting for the remote to confirm
    Pending,
}

/// What the dashboard renders for the device panel.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelView {
    /// Whether a device snapshot has been received
    pub loaded: bool,
    pub pump: bool,
    pub valve: bool,
    pub fan: bool,
    /// Displayed vent angle
    pub vent_angle: u8,
    pub vent_phase: VentPhase,
    /// Vent motor step delay in ms per degree
    pub vent_speed: u32,
    /// Global switch AND panel preference
    pub auto_mode: bool,
    pub local_auto_mode: bool,
    pub global_automation: bool,
    /// Manual controls are locked while automatic or not loaded
    pub controls_disabled: bool,
}

/// Actuator transition produced by rule evaluation.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorCommand {
    pub device: ActuatorDevice,
    /// Single-field device patch
    pub patch: DeviceSettings,
    /// Sensor whose rule fired
    pub sensor: SensorType,
    pub bound: Bound,
}

/// Two fired rules that disagree on the same actuator.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConflict {
    pub device: ActuatorDevice,
    /// Evaluated later, written last
    pub winner: ActuatorCommand,
    pub overridden: ActuatorCommand,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandSource {
    Automation,
    Manual,
    Sync,
}

impl core::fmt::Display for CommandSource {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            CommandSource::Automation => write!(f, "automation"),
            CommandSource::Manual => write!(f, "manual"),
            CommandSource::Sync => write!(f, "sync"),
        }
    }
}

impl From<String> for CommandSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "automation" => CommandSource::Automation,
            "sync" => CommandSource::Sync,
            _ => CommandSource::Manual,
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuatorLogResponse {
    pub id: i64,
    /// Device key written, e.g. `ventAngle`
    pub key: String,
    pub value: Value,
    pub source: CommandSource,
    pub success: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Operation result message
    pub message: String,
}
