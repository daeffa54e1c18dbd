use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::lenient;

/// Largest vent opening in degrees.
pub const MAX_VENT_ANGLE: u8 = 180;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorDevice {
    /// Water pump
    Pump,
    /// Water valve
    Valve,
    /// Ventilation fan
    Fan,
    /// Greenhouse vent flap
    Vent,
}

impl ActuatorDevice {
    pub const ALL: [ActuatorDevice; 4] = [
        ActuatorDevice::Pump,
        ActuatorDevice::Valve,
        ActuatorDevice::Fan,
        ActuatorDevice::Vent,
    ];

    /// Key of the device field written to the remote channel.
    pub fn key(&self) -> &'static str {
        match self {
            ActuatorDevice::Pump => DeviceSettings::PUMP,
            ActuatorDevice::Valve => DeviceSettings::VALVE,
            ActuatorDevice::Fan => DeviceSettings::FAN,
            ActuatorDevice::Vent => DeviceSettings::VENT_ANGLE,
        }
    }

    /// Whether the device is driven by an on/off switch rather than an angle.
    pub fn is_switch(&self) -> bool {
        !matches!(self, ActuatorDevice::Vent)
    }
}

impl ActuatorDevice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActuatorDevice::Pump => "pump",
            ActuatorDevice::Valve => "valve",
            ActuatorDevice::Fan => "fan",
            ActuatorDevice::Vent => "vent",
        }
    }
}

impl fmt::Display for ActuatorDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActuatorDevice {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ActuatorDevice::ALL
            .into_iter()
            .find(|device| device.as_str() == value)
            .ok_or_else(|| format!("unknown device: {value}"))
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValveState {
    Open,
    Close,
}

/// Action a rule applies to its actuator.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "actuator", rename_all = "lowercase")]
pub enum ActuatorAction {
    Pump {
        #[serde(rename = "targetState")]
        target_state: PowerState,
    },
    Fan {
        #[serde(rename = "targetState")]
        target_state: PowerState,
    },
    Valve {
        #[serde(rename = "targetState")]
        target_state: ValveState,
    },
    Vent {
        /// Vent opening in degrees (0-180)
        #[serde(rename = "targetAngle")]
        target_angle: u8,
    },
    /// No actuator wired to the rule
    #[default]
    None,
}

impl ActuatorAction {
    pub fn actuator(&self) -> Option<ActuatorDevice> {
        match self {
            ActuatorAction::Pump { .. } => Some(ActuatorDevice::Pump),
            ActuatorAction::Fan { .. } => Some(ActuatorDevice::Fan),
            ActuatorAction::Valve { .. } => Some(ActuatorDevice::Valve),
            ActuatorAction::Vent { .. } => Some(ActuatorDevice::Vent),
            ActuatorAction::None => None,
        }
    }

    /// Returns the offending angle when the action cannot be applied.
    pub fn validate(&self) -> Result<(), u8> {
        match self {
            ActuatorAction::Vent { target_angle } if *target_angle > MAX_VENT_ANGLE => {
                Err(*target_angle)
            }
            _ => Ok(()),
        }
    }

    /// Device settings patch implied by the action, `None` for the no-op action.
    pub fn to_patch(&self) -> Option<DeviceSettings> {
        let mut patch = DeviceSettings::default();

        match *self {
            ActuatorAction::Pump { target_state } => {
                patch.pump = Some(target_state == PowerState::On);
            }
            ActuatorAction::Fan { target_state } => {
                patch.fan = Some(target_state == PowerState::On);
            }
            ActuatorAction::Valve { target_state } => {
                patch.valve = Some(target_state == ValveState::Open);
            }
            ActuatorAction::Vent { target_angle } => {
                patch.vent_angle = Some(target_angle);
            }
            ActuatorAction::None => return None,
        }

        Some(patch)
    }
}

/// Device state as stored by the remote channel.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSettings {
    /// Device-side automation flag
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub auto_mode: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub pump: Option<bool>,
    /// `true` when open
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub valve: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub fan: Option<bool>,
    /// Vent opening in degrees (0-180)
    #[serde(default, deserialize_with = "lenient::angle", skip_serializing_if = "Option::is_none")]
    pub vent_angle: Option<u8>,
    /// Vent motor step delay in ms per degree
    #[serde(default, deserialize_with = "lenient::speed", skip_serializing_if = "Option::is_none")]
    pub vent_speed: Option<u32>,
}

impl DeviceSettings {
    pub const AUTO_MODE: &'static str = "autoMode";
    pub const PUMP: &'static str = "pump";
    pub const VALVE: &'static str = "valve";
    pub const FAN: &'static str = "fan";
    pub const VENT_ANGLE: &'static str = "ventAngle";
    pub const VENT_SPEED: &'static str = "ventSpeed";

    /// The fields that are set, as `(key, value)` pairs in declaration order.
    pub fn entries(&self) -> Vec<(&'static str, Value)> {
        let mut entries = Vec::new();

        if let Some(value) = self.auto_mode {
            entries.push((Self::AUTO_MODE, json!(value)));
        }
        if let Some(value) = self.pump {
            entries.push((Self::PUMP, json!(value)));
        }
        if let Some(value) = self.valve {
            entries.push((Self::VALVE, json!(value)));
        }
        if let Some(value) = self.fan {
            entries.push((Self::FAN, json!(value)));
        }
        if let Some(value) = self.vent_angle {
            entries.push((Self::VENT_ANGLE, json!(value)));
        }
        if let Some(value) = self.vent_speed {
            entries.push((Self::VENT_SPEED, json!(value)));
        }

        entries
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries()
            .into_iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    /// Current on/open state of a switch actuator.
    pub fn switch_state(&self, device: ActuatorDevice) -> Option<bool> {
        match device {
            ActuatorDevice::Pump => self.pump,
            ActuatorDevice::Valve => self.valve,
            ActuatorDevice::Fan => self.fan,
            ActuatorDevice::Vent => None,
        }
    }
}
