use agriview_api::models::*;
use agriview_server::repositories::PreferenceRepository;
use agriview_server::services::RuleStore;
use agriview_server::tests::*;
use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::mock_app::MockApp;

fn fan_on_below_15() -> serde_json::Value {
    json!({
        "enabled": true,
        "minRule": { "threshold": 15, "action": { "actuator": "fan", "targetState": "on" } },
        "maxRule": { "threshold": 30, "action": { "actuator": "none" } }
    })
}

#[tokio::test]
async fn test_default_rules() {
    let app = MockApp::new().await;

    let (status, body) = app.send(Method::GET, "/api/rules", None).await;
    assert_eq!(status, StatusCode::OK);

    for sensor in SensorType::ALL {
        assert_eq!(body[sensor.as_str()]["sensorType"], sensor.as_str());
        assert_eq!(body[sensor.as_str()]["enabled"], false);
        assert_eq!(body[sensor.as_str()]["minRule"]["action"]["actuator"], "none");
    }
}

#[tokio::test]
async fn test_patch_rule_persists() {
    let app = MockApp::new().await;

    let (status, body) = app
        .send(Method::PATCH, "/api/rules/temperature", Some(fan_on_below_15()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["minRule"]["threshold"], 15.0);

    let (_, body) = app.send(Method::GET, "/api/rules/temperature", None).await;
    assert_eq!(body["enabled"], true);

    let reloaded = RuleStore::new(PreferenceRepository::new(app.services.storage.clone())).await;
    let rule = reloaded.rule(SensorType::Temperature);
    assert!(rule.enabled);
    assert_eq!(
        rule.min_rule.action,
        ActuatorAction::Fan {
            target_state: PowerState::On
        }
    );
}

#[tokio::test]
async fn test_invalid_rules_rejected() {
    let app = MockApp::new().await;

    let (status, _) = app
        .send(
            Method::PATCH,
            "/api/rules/humidity",
            Some(json!({ "maxRule": { "threshold": 80, "action": { "actuator": "vent", "targetAngle": 200 } } })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PATCH,
            "/api/rules/humidity",
            Some(json!({ "maxRule": { "threshold": 80, "action": { "actuator": "vent", "targetState": "on" } } })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app.send(Method::GET, "/api/rules/co2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 404);
}

#[tokio::test]
async fn test_replace_all_rules() {
    let app = MockApp::new().await;

    let mut rules = default_automation_rules();
    rules.soil_moisture = SensorAutomationRule {
        sensor_type: SensorType::SoilMoisture,
        enabled: true,
        min_rule: SensorRuleSettings {
            threshold: Some(30.0),
            action: ActuatorAction::Pump {
                target_state: PowerState::On,
            },
        },
        max_rule: SensorRuleSettings {
            threshold: Some(70.0),
            action: ActuatorAction::Pump {
                target_state: PowerState::Off,
            },
        },
    };

    let (status, body) = app
        .send(Method::PUT, "/api/rules", Some(serde_json::to_value(&rules).unwrap()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::to_value(&rules).unwrap());
    assert_eq!(app.services.rule_store.rules(), rules);
}

#[tokio::test]
async fn test_rule_drives_actuator() {
    let app = MockApp::new().await;
    app.send(Method::PATCH, "/api/rules/temperature", Some(fan_on_below_15()))
        .await;

    app.channel
        .push_devices(&DeviceSettings {
            auto_mode: Some(true),
            ..create_test_devices()
        })
        .await;
    app.channel
        .push_readings(&SensorReadings {
            temperature: Some(10.0),
            ..Default::default()
        })
        .await;
    app.sync().await;

    assert_eq!(app.channel.writes().await, vec![(String::from("fan"), json!(true))]);

    let (_, history) = app.send(Method::GET, "/api/farm/history?limit=5", None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["source"], "automation");
    assert_eq!(history[0]["success"], true);

    // inside the band nothing more is written
    app.channel.clear_writes().await;
    app.channel.push("sensorData/temperature", json!(20.0)).await;
    app.sync().await;
    assert!(app.channel.writes().await.is_empty());
}
