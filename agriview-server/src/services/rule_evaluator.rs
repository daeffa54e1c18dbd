use agriview_api::models::*;

/// Decides which actuator patches the current readings call for.
///
/// Sensors are visited in enumeration order, min side before max side. A sensor
/// without a reading, a disabled rule, a side without threshold or a side wired to
/// no actuator never fires.
pub fn evaluate(
    readings: &SensorReadings,
    rules: &AutomationRulesState,
    global_enabled: bool,
) -> Vec<ActuatorCommand> {
    if !global_enabled {
        return Vec::new();
    }

    let mut commands = Vec::new();

    for rule in rules.iter().filter(|rule| rule.enabled) {
        let Some(value) = readings.get(rule.sensor_type) else {
            continue;
        };

        for bound in [Bound::Min, Bound::Max] {
            let side = rule.side(bound);

            let Some(threshold) = side.threshold else {
                continue;
            };

            let fires = match bound {
                Bound::Min => value < threshold,
                Bound::Max => value > threshold,
            };

            if !fires {
                continue;
            }

            if let (Some(device), Some(patch)) = (side.action.actuator(), side.action.to_patch()) {
                commands.push(ActuatorCommand {
                    device,
                    patch,
                    sensor: rule.sensor_type,
                    bound,
                });
            }
        }
    }

    commands
}

/// Pairs of commands driving one actuator to different states. The later command wins.
pub fn find_conflicts(commands: &[ActuatorCommand]) -> Vec<RuleConflict> {
    let mut conflicts = Vec::new();

    for (index, winner) in commands.iter().enumerate() {
        for overridden in &commands[..index] {
            if overridden.device == winner.device && overridden.patch != winner.patch {
                conflicts.push(RuleConflict {
                    device: winner.device,
                    winner: winner.clone(),
                    overridden: overridden.clone(),
                });
            }
        }
    }

    conflicts
}
