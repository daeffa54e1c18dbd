use agriview_api::models::*;
use serde_json::{Value, json};
use tokio::sync::{Mutex, watch};

use crate::errors::RuleError;
use crate::repositories::PreferenceRepository;

/// Preference key of the persisted rule blob.
pub const RULES_KEY: &str = "agriview_automation_rules";

pub struct RuleStore {
    repository: PreferenceRepository,
    state: watch::Sender<AutomationRulesState>,
    write_lock: Mutex<()>,
}

impl RuleStore {
    pub async fn new(repository: PreferenceRepository) -> Self {
        let initial = Self::load_from(&repository).await;
        let (state, _) = watch::channel(initial);

        Self {
            repository,
            state,
            write_lock: Mutex::new(()),
        }
    }

    /// Reads the persisted rules merged over defaults. Never fails.
    pub async fn load(&self) -> AutomationRulesState {
        Self::load_from(&self.repository).await
    }

    async fn load_from(repository: &PreferenceRepository) -> AutomationRulesState {
        let defaults = default_automation_rules();

        match repository.get(RULES_KEY).await {
            Ok(Some(preference)) => match serde_json::from_str::<Value>(&preference.value) {
                Ok(loaded) => Self::merge(&loaded, &defaults),
                Err(e) => {
                    tracing::warn!("Corrupt automation rules, using defaults: {}", e);
                    defaults
                }
            },
            Ok(None) => {
                tracing::debug!("no stored automation rules, using defaults");
                defaults
            }
            Err(e) => {
                tracing::error!("Failed to read automation rules: {}", e);
                defaults
            }
        }
    }

    /// Best effort, failures are only logged.
    pub async fn save(&self, state: &AutomationRulesState) {
        let value = match serde_json::to_string(state) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to encode automation rules: {}", e);
                return;
            }
        };

        if let Err(e) = self.repository.set(RULES_KEY, &value).await {
            tracing::error!("Failed to save automation rules: {}", e);
        }
    }

    /// Applies the loaded fields of every sensor over its defaults.
    ///
    /// Only non-null top-level fields override, `sensorType` always follows the
    /// key, and a sensor whose merged rule is unusable keeps its default.
    pub fn merge(loaded: &Value, defaults: &AutomationRulesState) -> AutomationRulesState {
        let mut merged = defaults.clone();

        let Some(loaded) = loaded.as_object() else {
            tracing::warn!("stored automation rules are not an object, using defaults");
            return merged;
        };

        for sensor in SensorType::ALL {
            let Some(Value::Object(fields)) = loaded.get(sensor.as_str()) else {
                continue;
            };

            let Ok(Value::Object(mut object)) = serde_json::to_value(defaults.get(sensor)) else {
                continue;
            };

            for (field, value) in fields.iter().filter(|(_, value)| !value.is_null()) {
                object.insert(field.clone(), value.clone());
            }
            object.insert(String::from("sensorType"), json!(sensor));

            match serde_json::from_value::<SensorAutomationRule>(Value::Object(object)) {
                Ok(rule) => match validate_rule(&rule) {
                    Ok(()) => *merged.get_mut(sensor) = rule,
                    Err(e) => tracing::warn!("Invalid stored rule for {}: {}", sensor, e),
                },
                Err(e) => tracing::warn!("Unreadable stored rule for {}: {}", sensor, e),
            }
        }

        merged
    }

    pub fn rules(&self) -> AutomationRulesState {
        self.state.borrow().clone()
    }

    pub fn rule(&self, sensor: SensorType) -> SensorAutomationRule {
        self.state.borrow().get(sensor).clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutomationRulesState> {
        self.state.subscribe()
    }

    /// Shallow-merges `patch` into the sensor's rule and persists the whole set.
    pub async fn update(
        &self,
        sensor: SensorType,
        patch: RulePatch,
    ) -> Result<SensorAutomationRule, RuleError> {
        let _guard = self.write_lock.lock().await;

        let mut rules = self.rules();
        let rule = rules.get_mut(sensor);
        rule.apply(patch);
        validate_rule(rule)?;
        let rule = rule.clone();

        self.state.send_replace(rules.clone());
        self.save(&rules).await;

        tracing::info!("automation rule for {} updated", sensor);

        Ok(rule)
    }

    /// Swaps in a complete rule set.
    pub async fn replace(&self, mut rules: AutomationRulesState) -> Result<AutomationRulesState, RuleError> {
        let _guard = self.write_lock.lock().await;

        for sensor in SensorType::ALL {
            let rule = rules.get_mut(sensor);
            rule.sensor_type = sensor;
            validate_rule(rule)?;
        }

        self.state.send_replace(rules.clone());
        self.save(&rules).await;

        tracing::info!("automation rules replaced");

        Ok(rules)
    }
}

pub fn validate_rule(rule: &SensorAutomationRule) -> Result<(), RuleError> {
    for side in [&rule.min_rule, &rule.max_rule] {
        if side.threshold.is_some_and(|threshold| !threshold.is_finite()) {
            return Err(RuleError::InvalidThreshold);
        }

        side.action.validate().map_err(RuleError::InvalidAngle)?;
    }

    Ok(())
}
