use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::configs::normalize_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

/// MQTT broker carrying the farm's realtime data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gateway {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    /// Opaque id of the farm this dashboard watches
    pub farm_id: String,
    #[serde(default = "Gateway::default_topic_root")]
    pub topic_root: String,
    #[serde(default = "Gateway::default_keep_alive")]
    pub keep_alive_secs: u64,
    #[serde(default = "Gateway::default_write_timeout")]
    pub write_timeout_ms: u64,
    pub auth: Option<GatewayAuth>,
}

impl Gateway {
    fn default_topic_root() -> String {
        String::from("farms")
    }

    fn default_keep_alive() -> u64 {
        5
    }

    fn default_write_timeout() -> u64 {
        3000
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayAuth {
    pub cert_path: String,
    pub key_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub clean_start: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Automation {
    /// State of the global automation switch at process start
    pub global_default: bool,
}

impl Default for Automation {
    fn default() -> Self {
        Self { global_default: true }
    }
}

/// Hosted language model used by the crop advisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advisor {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    #[serde(default = "Advisor::default_timeout")]
    pub timeout_secs: u64,
}

impl Advisor {
    fn default_timeout() -> u64 {
        30
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub gateway: Gateway,
    pub database: Database,
    #[serde(default)]
    pub automation: Automation,
    pub advisor: Advisor,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("AGRIVIEW").prefix_separator("_").separator("__"))
            .build()?
            .try_deserialize()?;

        if let Some(auth) = &settings.gateway.auth {
            let cert_path = normalize_path(&auth.cert_path)
                .map_err(|e| ConfigError::Message(e.to_string()))?
                .to_string_lossy()
                .to_string();
            let key_path = normalize_path(&auth.key_path)
                .map_err(|e| ConfigError::Message(e.to_string()))?
                .to_string_lossy()
                .to_string();

            settings.gateway.auth = Some(GatewayAuth { cert_path, key_path });
        }

        if settings.advisor.api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            settings.advisor.api_key = None;
        }

        Ok(settings)
    }
}
