//! Helpers shared by unit tests and, through the `mock` feature, integration tests.

use std::sync::Arc;

use agriview_api::models::*;

use crate::configs::{Database, SchemaManager, Storage};
use crate::repositories::{ActuatorLogRepository, PreferenceRepository};
use crate::services::{AutomationSwitch, ControlPanel, MemoryChannel, RemoteChannel};

pub const TEST_FARM_ID: &str = "farm-test";

pub async fn setup_test_db() -> Arc<Storage> {
    Arc::new(
        Storage::new(
            Database {
                clean_start: true,
                url: String::from("sqlite::memory:"),
            },
            SchemaManager::default(),
        )
        .await
        .unwrap(),
    )
}

pub fn create_test_channel() -> Arc<MemoryChannel> {
    Arc::new(MemoryChannel::new(TEST_FARM_ID))
}

pub fn create_test_panel(
    storage: Arc<Storage>,
    channel: Arc<MemoryChannel>,
    switch: Arc<AutomationSwitch>,
) -> Arc<ControlPanel> {
    let channel: Arc<dyn RemoteChannel> = channel;
    Arc::new(ControlPanel::new(
        channel,
        switch,
        ActuatorLogRepository::new(storage),
    ))
}

pub fn create_test_preferences(storage: Arc<Storage>) -> PreferenceRepository {
    PreferenceRepository::new(storage)
}

/// Device state as reported by a freshly booted controller.
pub fn create_test_devices() -> DeviceSettings {
    DeviceSettings {
        auto_mode: Some(false),
        pump: Some(false),
        valve: Some(false),
        fan: Some(false),
        vent_angle: Some(45),
        vent_speed: Some(20),
    }
}

/// Temperature rule turning the fan on below 15 degrees.
pub fn create_test_fan_rule() -> SensorAutomationRule {
    SensorAutomationRule {
        sensor_type: SensorType::Temperature,
        enabled: true,
        min_rule: SensorRuleSettings {
            threshold: Some(15.0),
            action: ActuatorAction::Fan {
                target_state: PowerState::On,
            },
        },
        max_rule: SensorRuleSettings {
            threshold: Some(30.0),
            action: ActuatorAction::None,
        },
    }
}
