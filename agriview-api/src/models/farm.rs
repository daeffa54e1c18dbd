use serde::{Deserialize, Serialize};

use super::{DeviceSettings, SensorReadings, lenient};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    /// Last device heartbeat in milliseconds since epoch
    #[serde(default, deserialize_with = "lenient::rounded", skip_serializing_if = "Option::is_none")]
    pub last_update: Option<i64>,
    /// Wi-Fi signal strength in dBm
    #[serde(default, deserialize_with = "lenient::rounded", skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i32>,
    /// Reported status, usually `online` or `offline`
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Snapshot of one farm as pushed by the remote channel.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<DeviceSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_data: Option<SensorReadings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemInfo>,
}
