use serde::{Deserialize, Serialize};

use super::{ActuatorAction, SensorType};

/// Side of a rule: `Min` fires below the threshold, `Max` above it.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Min,
    Max,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRuleSettings {
    /// Threshold value, unset while the side is not configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Action applied when the threshold is crossed
    #[serde(default)]
    pub action: ActuatorAction,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorAutomationRule {
    pub sensor_type: SensorType,
    pub enabled: bool,
    /// Applied when the reading is strictly less than its threshold
    pub min_rule: SensorRuleSettings,
    /// Applied when the reading is strictly greater than its threshold
    pub max_rule: SensorRuleSettings,
}

impl SensorAutomationRule {
    /// Disabled rule with both sides unconfigured.
    pub fn new(sensor_type: SensorType) -> Self {
        Self {
            sensor_type,
            enabled: false,
            min_rule: SensorRuleSettings::default(),
            max_rule: SensorRuleSettings::default(),
        }
    }

    pub fn side(&self, bound: Bound) -> &SensorRuleSettings {
        match bound {
            Bound::Min => &self.min_rule,
            Bound::Max => &self.max_rule,
        }
    }

    /// Shallow merge: every field present in the patch replaces the current one.
    pub fn apply(&mut self, patch: RulePatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(min_rule) = patch.min_rule {
            self.min_rule = min_rule;
        }
        if let Some(max_rule) = patch.max_rule {
            self.max_rule = max_rule;
        }
    }
}

/// Partial rule update.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rule: Option<SensorRuleSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rule: Option<SensorRuleSettings>,
}

/// One rule per sensor. Every sensor has an entry by construction.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRulesState {
    pub temperature: SensorAutomationRule,
    pub humidity: SensorAutomationRule,
    pub soil_moisture: SensorAutomationRule,
    pub light_intensity: SensorAutomationRule,
    pub methane_level: SensorAutomationRule,
}

impl AutomationRulesState {
    pub fn get(&self, sensor: SensorType) -> &SensorAutomationRule {
        match sensor {
            SensorType::Temperature => &self.temperature,
            SensorType::Humidity => &self.humidity,
            SensorType::SoilMoisture => &self.soil_moisture,
            SensorType::LightIntensity => &self.light_intensity,
            SensorType::MethaneLevel => &self.methane_level,
        }
    }

    pub fn get_mut(&mut self, sensor: SensorType) -> &mut SensorAutomationRule {
        match sensor {
            SensorType::Temperature => &mut self.temperature,
            SensorType::Humidity => &mut self.humidity,
            SensorType::SoilMoisture => &mut self.soil_moisture,
            SensorType::LightIntensity => &mut self.light_intensity,
            SensorType::MethaneLevel => &mut self.methane_level,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorAutomationRule> {
        SensorType::ALL.into_iter().map(|sensor| self.get(sensor))
    }
}

impl Default for AutomationRulesState {
    fn default() -> Self {
        default_automation_rules()
    }
}

/// Every sensor disabled, no thresholds, no actions.
pub fn default_automation_rules() -> AutomationRulesState {
    AutomationRulesState {
        temperature: SensorAutomationRule::new(SensorType::Temperature),
        humidity: SensorAutomationRule::new(SensorType::Humidity),
        soil_moisture: SensorAutomationRule::new(SensorType::SoilMoisture),
        light_intensity: SensorAutomationRule::new(SensorType::LightIntensity),
        methane_level: SensorAutomationRule::new(SensorType::MethaneLevel),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::PowerState;

    #[test]
    fn test_default_rules_shape() {
        let value = serde_json::to_value(default_automation_rules()).unwrap();

        assert_eq!(
            value["methaneLevel"],
            json!({
                "sensorType": "methaneLevel",
                "enabled": false,
                "minRule": { "action": { "actuator": "none" } },
                "maxRule": { "action": { "actuator": "none" } }
            })
        );
    }

    #[test]
    fn test_iter_follows_enumeration_order() {
        let rules = default_automation_rules();
        let order: Vec<SensorType> = rules.iter().map(|rule| rule.sensor_type).collect();

        assert_eq!(order, SensorType::ALL.to_vec());
    }

    #[test]
    fn test_patch_is_shallow() {
        let mut rule = SensorAutomationRule::new(SensorType::Temperature);
        rule.max_rule.threshold = Some(30.0);

        rule.apply(RulePatch {
            enabled: Some(true),
            min_rule: Some(SensorRuleSettings {
                threshold: Some(15.0),
                action: ActuatorAction::Fan { target_state: PowerState::On },
            }),
            max_rule: None,
        });

        assert!(rule.enabled);
        assert_eq!(rule.min_rule.threshold, Some(15.0));
        assert_eq!(rule.max_rule.threshold, Some(30.0));
    }
}
