use std::sync::Arc;

use agriview_api::models::*;
use serde_json::{Value, json};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::rule_evaluator::{evaluate, find_conflicts};
use super::{AutomationSwitch, ControlPanel, EventBus, RemoteChannel, RuleStore, ServiceEvent};

/// Reacts to remote snapshots, switch flips and rule edits.
pub struct AutomationService {
    channel: Arc<dyn RemoteChannel>,
    rule_store: Arc<RuleStore>,
    switch: Arc<AutomationSwitch>,
    panel: Arc<ControlPanel>,
    events: EventBus,
}

impl AutomationService {
    pub fn new(
        channel: Arc<dyn RemoteChannel>,
        rule_store: Arc<RuleStore>,
        switch: Arc<AutomationSwitch>,
        panel: Arc<ControlPanel>,
        events: EventBus,
    ) -> Self {
        Self {
            channel,
            rule_store,
            switch,
            panel,
            events,
        }
    }

    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    pub async fn run(&self) {
        let mut snapshots = self.channel.subscribe();
        let mut switch = self.switch.subscribe();
        let mut rules = self.rule_store.subscribe();

        tracing::info!("automation listener started for farm {}", self.channel.farm_id());

        if let Some(snapshot) = self.channel.snapshot().await {
            self.handle_snapshot(snapshot).await;
        }

        loop {
            tokio::select! {
                received = snapshots.recv() => match received {
                    Ok(snapshot) => self.handle_snapshot(snapshot).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("automation listener lagged, {} snapshots skipped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
                changed = switch.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let enabled = *switch.borrow_and_update();
                    self.handle_switch(enabled).await;
                },
                changed = rules.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.handle_rules_change().await;
                },
            }
        }

        tracing::info!("automation listener stopped");
    }

    pub async fn handle_snapshot(&self, snapshot: FarmData) {
        self.events.publish(ServiceEvent::Snapshot(snapshot.clone()));

        if let Some(devices) = &snapshot.devices {
            if let Some(auto_mode) = self.panel.apply_snapshot(devices).await {
                self.sync_auto_mode(auto_mode).await;
            }
            self.events.publish(ServiceEvent::Panel(self.panel.view().await));
        }

        self.apply_rules(&snapshot).await;
    }

    pub async fn handle_switch(&self, enabled: bool) {
        if let Some(auto_mode) = self.panel.on_global_change(enabled).await {
            self.sync_auto_mode(auto_mode).await;
        }

        self.events.publish(ServiceEvent::Automation { enabled });
        self.events.publish(ServiceEvent::Panel(self.panel.view().await));

        if enabled {
            if let Some(snapshot) = self.channel.snapshot().await {
                self.apply_rules(&snapshot).await;
            }
        }
    }

    pub async fn handle_rules_change(&self) {
        if let Some(snapshot) = self.channel.snapshot().await {
            self.apply_rules(&snapshot).await;
        }
    }

    /// Evaluates the rules against the snapshot's readings and writes the outcome.
    ///
    /// Commands are folded into one target per key first, the last command in
    /// evaluation order winning, so an overridden value is never written. Keys
    /// already holding their target are skipped. A failed write does not stop or
    /// undo the others.
    async fn apply_rules(&self, snapshot: &FarmData) {
        let Some(readings) = &snapshot.sensor_data else {
            return;
        };

        let rules = self.rule_store.rules();
        let commands = evaluate(readings, &rules, self.switch.is_enabled());

        if commands.is_empty() {
            return;
        }

        for conflict in find_conflicts(&commands) {
            tracing::warn!(
                "{} rule of {} overrides {} rule of {} on {}",
                bound_name(conflict.winner.bound),
                conflict.winner.sensor,
                bound_name(conflict.overridden.bound),
                conflict.overridden.sensor,
                conflict.device
            );
            self.events.publish(ServiceEvent::Conflict(conflict));
        }

        let devices = snapshot.devices.clone().unwrap_or_default();

        for (key, value, command) in fold_targets(&commands) {
            if devices.get(key).as_ref() == Some(&value) {
                tracing::trace!("{} already {}", key, value);
                continue;
            }

            if let Err(e) = self.panel.dispatch(key, value, CommandSource::Automation).await {
                self.events.publish(ServiceEvent::Error {
                    message: format!(
                        "Automation could not set {} for {} rule of {}: {}",
                        key,
                        bound_name(command.bound),
                        command.sensor,
                        e
                    ),
                });
            }
        }
    }

    async fn sync_auto_mode(&self, auto_mode: bool) {
        if let Err(e) = self
            .panel
            .dispatch(DeviceSettings::AUTO_MODE, json!(auto_mode), CommandSource::Sync)
            .await
        {
            self.events.publish(ServiceEvent::Error {
                message: format!("Could not sync automation mode: {}", e),
            });
        }
    }
}

/// Final value per device key with the command that set it, in first-touched key order.
fn fold_targets(commands: &[ActuatorCommand]) -> Vec<(&'static str, Value, &ActuatorCommand)> {
    let mut targets: Vec<(&'static str, Value, &ActuatorCommand)> = Vec::new();

    for command in commands {
        for (key, value) in command.patch.entries() {
            match targets.iter_mut().find(|(target, ..)| *target == key) {
                Some(target) => *target = (key, value, command),
                None => targets.push((key, value, command)),
            }
        }
    }

    targets
}

fn bound_name(bound: Bound) -> &'static str {
    match bound {
        Bound::Min => "min",
        Bound::Max => "max",
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::repositories::ActuatorLogRepository;
    use crate::services::MemoryChannel;
    use crate::tests::*;

    struct Harness {
        service: Arc<AutomationService>,
        channel: Arc<MemoryChannel>,
        switch: Arc<AutomationSwitch>,
        rule_store: Arc<RuleStore>,
        events: EventBus,
        logs: ActuatorLogRepository,
    }

    async fn harness(global: bool) -> Harness {
        harness_on(create_test_channel(), global).await
    }

    async fn harness_on(channel: Arc<MemoryChannel>, global: bool) -> Harness {
        let storage = setup_test_db().await;
        let switch = Arc::new(AutomationSwitch::new(global));
        let rule_store = Arc::new(RuleStore::new(create_test_preferences(storage.clone())).await);
        let panel = create_test_panel(storage.clone(), channel.clone(), switch.clone());
        let events = EventBus::default();

        rule_store
            .update(
                SensorType::Temperature,
                RulePatch {
                    enabled: Some(true),
                    min_rule: Some(create_test_fan_rule().min_rule),
                    max_rule: None,
                },
            )
            .await
            .unwrap();

        let dyn_channel: Arc<dyn RemoteChannel> = channel.clone();
        let service = Arc::new(AutomationService::new(
            dyn_channel,
            rule_store.clone(),
            switch.clone(),
            panel,
            events.clone(),
        ));

        Harness {
            service,
            channel,
            switch,
            rule_store,
            events,
            logs: ActuatorLogRepository::new(storage),
        }
    }

    fn cold() -> SensorReadings {
        SensorReadings {
            temperature: Some(10.0),
            ..Default::default()
        }
    }

    /// Humidity rule fighting the temperature rule over the fan.
    async fn add_humid_fan_off_rule(rule_store: &RuleStore) {
        rule_store
            .update(
                SensorType::Humidity,
                RulePatch {
                    enabled: Some(true),
                    min_rule: None,
                    max_rule: Some(SensorRuleSettings {
                        threshold: Some(80.0),
                        action: ActuatorAction::Fan { target_state: PowerState::Off },
                    }),
                },
            )
            .await
            .unwrap();
    }

    fn cold_and_humid() -> SensorReadings {
        SensorReadings {
            temperature: Some(10.0),
            humidity: Some(95.0),
            ..Default::default()
        }
    }

    fn automatic_devices() -> DeviceSettings {
        DeviceSettings {
            auto_mode: Some(true),
            ..create_test_devices()
        }
    }

    #[tokio::test]
    async fn test_snapshot_triggers_rule_write() {
        let h = harness(true).await;

        h.channel.push_devices(&automatic_devices()).await;
        let snapshot = h.channel.push_readings(&cold()).await;
        h.service.handle_snapshot(snapshot).await;

        assert_eq!(h.channel.writes().await, vec![(String::from("fan"), json!(true))]);

        let recent = h.logs.find_recent(1).await.unwrap();
        assert_eq!(recent[0].source, "automation");
    }

    #[tokio::test]
    async fn test_satisfied_patch_is_skipped() {
        let h = harness(true).await;

        h.channel
            .push_devices(&DeviceSettings {
                fan: Some(true),
                ..automatic_devices()
            })
            .await;
        let snapshot = h.channel.push_readings(&cold()).await;
        h.service.handle_snapshot(snapshot).await;

        assert!(h.channel.writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_switch_off_blocks_writes() {
        let h = harness(false).await;

        h.channel.push_devices(&create_test_devices()).await;
        let snapshot = h.channel.push_readings(&cold()).await;
        h.service.handle_snapshot(snapshot).await;

        assert!(h.channel.writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_auto_mode_is_synced() {
        let h = harness(true).await;

        // device still in manual mode from an earlier session
        let snapshot = h.channel.push_devices(&create_test_devices()).await;
        h.service.handle_snapshot(snapshot).await;

        assert_eq!(h.channel.writes().await, vec![(String::from("autoMode"), json!(true))]);
        assert_eq!(h.logs.find_recent(1).await.unwrap()[0].source, "sync");
    }

    #[tokio::test]
    async fn test_write_failure_is_published() {
        let h = harness(true).await;
        let mut receiver = h.events.subscribe();

        h.channel.push_devices(&automatic_devices()).await;
        let snapshot = h.channel.push_readings(&cold()).await;
        h.channel.set_fail_writes(true);
        h.service.handle_snapshot(snapshot).await;

        let mut names = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            names.push(event.name());
        }
        assert_eq!(names, vec!["snapshot", "panel", "error"]);
        assert!(!h.logs.find_recent(1).await.unwrap()[0].success);
    }

    #[tokio::test]
    async fn test_conflict_writes_only_the_winner() {
        let h = harness(true).await;
        add_humid_fan_off_rule(&h.rule_store).await;
        let mut receiver = h.events.subscribe();

        h.channel
            .push_devices(&DeviceSettings {
                fan: Some(true),
                ..automatic_devices()
            })
            .await;
        let snapshot = h.channel.push_readings(&cold_and_humid()).await;
        h.service.handle_snapshot(snapshot).await;

        assert_eq!(h.channel.writes().await, vec![(String::from("fan"), json!(false))]);

        let mut conflicts = 0;
        while let Ok(event) = receiver.try_recv() {
            if let ServiceEvent::Conflict(conflict) = event {
                assert_eq!(conflict.winner.sensor, SensorType::Humidity);
                conflicts += 1;
            }
        }
        assert_eq!(conflicts, 1);
    }

    #[tokio::test]
    async fn test_conflict_already_settled_writes_nothing() {
        let h = harness(true).await;
        add_humid_fan_off_rule(&h.rule_store).await;

        h.channel.push_devices(&automatic_devices()).await;
        let snapshot = h.channel.push_readings(&cold_and_humid()).await;
        h.service.handle_snapshot(snapshot).await;

        assert!(h.channel.writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_conflicting_rules_settle_with_echoing_channel() {
        let channel = Arc::new(MemoryChannel::new(TEST_FARM_ID).with_echo(true));
        let h = harness_on(channel, true).await;
        add_humid_fan_off_rule(&h.rule_store).await;

        h.channel
            .push_devices(&DeviceSettings {
                fan: Some(true),
                ..automatic_devices()
            })
            .await;

        let handle = h.service.clone().start();
        tokio::time::sleep(Duration::from_millis(50)).await;

        h.channel.push_readings(&cold_and_humid()).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        let settled = h.channel.writes().await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        let later = h.channel.writes().await;

        assert_eq!(settled, vec![(String::from("fan"), json!(false))]);
        assert_eq!(later.len(), settled.len());

        handle.abort();
    }

    #[tokio::test]
    async fn test_listener_follows_channel_and_switch() {
        let h = harness(false).await;
        h.channel.push_devices(&create_test_devices()).await;
        h.channel.push_readings(&cold()).await;

        let handle = h.service.clone().start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(h.channel.writes().await.is_empty());

        h.switch.set(true);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let writes = h.channel.writes().await;
        assert!(writes.contains(&(String::from("fan"), json!(true))));

        handle.abort();
    }
}
