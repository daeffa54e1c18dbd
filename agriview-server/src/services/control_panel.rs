use std::sync::Arc;

use agriview_api::models::*;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use super::reconciliation::{CommitOutcome, SliderReconciler, ToggleReconciler};
use super::{AutomationSwitch, RemoteChannel};
use crate::errors::{ChannelError, DeviceError};
use crate::repositories::ActuatorLogRepository;

/// Vent step delay in ms per degree shown until the device reports its own.
pub const DEFAULT_VENT_SPEED: u32 = 20;

struct PanelState {
    loaded: bool,
    pump: ToggleReconciler,
    valve: ToggleReconciler,
    fan: ToggleReconciler,
    vent: SliderReconciler,
    vent_speed: u32,
    local_auto: ToggleReconciler,
    remote_auto: Option<bool>,
}

impl PanelState {
    fn toggle_mut(&mut self, device: ActuatorDevice) -> Option<&mut ToggleReconciler> {
        match device {
            ActuatorDevice::Pump => Some(&mut self.pump),
            ActuatorDevice::Valve => Some(&mut self.valve),
            ActuatorDevice::Fan => Some(&mut self.fan),
            ActuatorDevice::Vent => None,
        }
    }
}

/// Dashboard controls for the actuators, reconciled against the remote device state.
pub struct ControlPanel {
    channel: Arc<dyn RemoteChannel>,
    switch: Arc<AutomationSwitch>,
    log_repository: ActuatorLogRepository,
    state: Mutex<PanelState>,
}

impl ControlPanel {
    pub fn new(
        channel: Arc<dyn RemoteChannel>,
        switch: Arc<AutomationSwitch>,
        log_repository: ActuatorLogRepository,
    ) -> Self {
        let local_auto = switch.is_enabled();

        Self {
            channel,
            switch,
            log_repository,
            state: Mutex::new(PanelState {
                loaded: false,
                pump: ToggleReconciler::new(false),
                valve: ToggleReconciler::new(false),
                fan: ToggleReconciler::new(false),
                vent: SliderReconciler::new(0),
                vent_speed: DEFAULT_VENT_SPEED,
                local_auto: ToggleReconciler::new(local_auto),
                remote_auto: None,
            }),
        }
    }

    pub async fn view(&self) -> PanelView {
        let state = self.state.lock().await;
        self.render(&state)
    }

    fn render(&self, state: &PanelState) -> PanelView {
        let global = self.switch.is_enabled();
        let auto_mode = global && state.local_auto.value();

        PanelView {
            loaded: state.loaded,
            pump: state.pump.value(),
            valve: state.valve.value(),
            fan: state.fan.value(),
            vent_angle: state.vent.display(),
            vent_phase: state.vent.phase().into(),
            vent_speed: state.vent_speed,
            auto_mode,
            local_auto_mode: state.local_auto.value(),
            global_automation: global,
            controls_disabled: !state.loaded || auto_mode,
        }
    }

    /// Feeds remote device values into the controls.
    ///
    /// Returns the `autoMode` value to write when the device disagrees with the
    /// effective automation mode.
    pub async fn apply_snapshot(&self, devices: &DeviceSettings) -> Option<bool> {
        let mut state = self.state.lock().await;
        state.loaded = true;

        for device in ActuatorDevice::ALL {
            if let (Some(value), Some(toggle)) = (devices.switch_state(device), state.toggle_mut(device)) {
                toggle.on_remote(value);
            }
        }
        if let Some(angle) = devices.vent_angle {
            state.vent.on_remote(angle.min(MAX_VENT_ANGLE));
        }
        if let Some(speed) = devices.vent_speed {
            state.vent_speed = speed;
        }

        state.remote_auto = devices.auto_mode;

        self.auto_mode_sync(&state)
    }

    /// Reacts to the global switch. Turning it off also turns the local preference off.
    pub async fn on_global_change(&self, enabled: bool) -> Option<bool> {
        let mut state = self.state.lock().await;

        if !enabled && state.local_auto.value() {
            state.local_auto.reset(false);
            tracing::info!("global automation off, panel forced to manual mode");
        }

        self.auto_mode_sync(&state)
    }

    fn auto_mode_sync(&self, state: &PanelState) -> Option<bool> {
        let effective = self.switch.is_enabled() && state.local_auto.value();

        match state.remote_auto {
            Some(remote) if remote != effective => Some(effective),
            _ => None,
        }
    }

    pub async fn set_local_auto(&self, auto: bool) -> Result<PanelView, DeviceError> {
        if auto && !self.switch.is_enabled() {
            return Err(DeviceError::GlobalAutomationDisabled);
        }

        self.state
            .lock()
            .await
            .local_auto
            .begin(auto)
            .map_err(|_| DeviceError::WriteInFlight(DeviceSettings::AUTO_MODE))?;

        let effective = auto && self.switch.is_enabled();
        let result = self
            .dispatch(DeviceSettings::AUTO_MODE, json!(effective), CommandSource::Manual)
            .await;

        let mut state = self.state.lock().await;
        match result {
            Ok(()) => {
                state.local_auto.succeed();
                Ok(self.render(&state))
            }
            Err(e) => {
                state.local_auto.fail();
                Err(Self::write_failed(DeviceSettings::AUTO_MODE, e))
            }
        }
    }

    pub async fn set_toggle(&self, device: ActuatorDevice, value: bool) -> Result<PanelView, DeviceError> {
        if !device.is_switch() {
            return Err(DeviceError::NotASwitch);
        }

        {
            let mut state = self.state.lock().await;
            self.ensure_manual(&state)?;

            if let Some(toggle) = state.toggle_mut(device) {
                toggle
                    .begin(value)
                    .map_err(|_| DeviceError::WriteInFlight(device.key()))?;
            }
        }

        let result = self.dispatch(device.key(), json!(value), CommandSource::Manual).await;

        let mut state = self.state.lock().await;
        let Some(toggle) = state.toggle_mut(device) else {
            return Err(DeviceError::NotASwitch);
        };

        match result {
            Ok(()) => {
                toggle.succeed();
                Ok(self.render(&state))
            }
            Err(e) => {
                toggle.fail();
                Err(Self::write_failed(device.key(), e))
            }
        }
    }

    pub async fn drag_vent(&self, angle: u16) -> Result<PanelView, DeviceError> {
        let angle = Self::vent_angle(angle)?;

        let mut state = self.state.lock().await;
        self.ensure_manual(&state)?;
        state.vent.drag(angle);

        Ok(self.render(&state))
    }

    pub async fn commit_vent(&self, angle: u16) -> Result<PanelView, DeviceError> {
        let angle = Self::vent_angle(angle)?;

        let outcome = {
            let mut state = self.state.lock().await;
            self.ensure_manual(&state)?;
            state
                .vent
                .commit(angle)
                .map_err(|_| DeviceError::WriteInFlight(DeviceSettings::VENT_ANGLE))?
        };

        if let CommitOutcome::Write(angle) = outcome {
            let result = self
                .dispatch(DeviceSettings::VENT_ANGLE, json!(angle), CommandSource::Manual)
                .await;

            let mut state = self.state.lock().await;
            match result {
                Ok(()) => state.vent.write_succeeded(),
                Err(e) => {
                    state.vent.write_failed();
                    return Err(Self::write_failed(DeviceSettings::VENT_ANGLE, e));
                }
            }
        }

        Ok(self.view().await)
    }

    /// Writes one device key and records the attempt.
    pub async fn dispatch(&self, key: &str, value: Value, source: CommandSource) -> Result<(), ChannelError> {
        let result = self.channel.write(key, value.clone()).await;

        match &result {
            Ok(()) => tracing::info!("{} write {} = {}", source, key, value),
            Err(e) => tracing::error!("{} write {} = {} failed: {}", source, key, value, e),
        }

        if let Err(e) = self
            .log_repository
            .create(key, &value.to_string(), &source.to_string(), result.is_ok())
            .await
        {
            tracing::warn!("Failed to record actuator write: {}", e);
        }

        result
    }

    fn ensure_manual(&self, state: &PanelState) -> Result<(), DeviceError> {
        if !state.loaded {
            return Err(DeviceError::NotLoaded);
        }
        if self.switch.is_enabled() && state.local_auto.value() {
            return Err(DeviceError::AutomationActive);
        }

        Ok(())
    }

    fn vent_angle(angle: u16) -> Result<u8, DeviceError> {
        u8::try_from(angle)
            .ok()
            .filter(|angle| *angle <= MAX_VENT_ANGLE)
            .ok_or(DeviceError::InvalidAngle(angle))
    }

    fn write_failed(key: &'static str, e: ChannelError) -> DeviceError {
        DeviceError::WriteFailed {
            key,
            reason: e.to_string(),
        }
    }
}
