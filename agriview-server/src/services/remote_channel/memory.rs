use std::sync::atomic::{AtomicBool, Ordering};

use agriview_api::models::{DeviceSettings, FarmData, SensorReadings};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, broadcast};

use super::{FarmTree, RemoteChannel};
use crate::errors::ChannelError;

/// In-memory channel for tests. Writes are recorded and, with echo on, pushed back like a broker would.
pub struct MemoryChannel {
    farm_id: String,
    tree: Mutex<FarmTree>,
    latest: Mutex<Option<FarmData>>,
    writes: Mutex<Vec<(String, Value)>>,
    sender: broadcast::Sender<FarmData>,
    echo: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryChannel {
    pub fn new(farm_id: &str) -> Self {
        let (sender, _) = broadcast::channel(100);

        Self {
            farm_id: farm_id.to_string(),
            tree: Mutex::new(FarmTree::new()),
            latest: Mutex::new(None),
            writes: Mutex::new(Vec::new()),
            sender,
            echo: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn with_echo(self, echo: bool) -> Self {
        self.echo.store(echo, Ordering::SeqCst);
        self
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Simulates a remote update at a `/` separated path.
    pub async fn push(&self, path: &str, value: Value) -> FarmData {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let snapshot = {
            let mut tree = self.tree.lock().await;
            tree.set(&segments, value);
            tree.decode()
        };

        *self.latest.lock().await = Some(snapshot.clone());
        let _ = self.sender.send(snapshot.clone());

        snapshot
    }

    pub async fn push_devices(&self, devices: &DeviceSettings) -> FarmData {
        self.push("devices", serde_json::to_value(devices).unwrap_or_default()).await
    }

    pub async fn push_readings(&self, readings: &SensorReadings) -> FarmData {
        self.push("sensorData", serde_json::to_value(readings).unwrap_or_default()).await
    }

    pub async fn writes(&self) -> Vec<(String, Value)> {
        self.writes.lock().await.clone()
    }

    pub async fn clear_writes(&self) {
        self.writes.lock().await.clear();
    }
}

#[async_trait]
impl RemoteChannel for MemoryChannel {
    fn farm_id(&self) -> &str {
        &self.farm_id
    }

    fn subscribe(&self) -> broadcast::Receiver<FarmData> {
        self.sender.subscribe()
    }

    async fn snapshot(&self) -> Option<FarmData> {
        self.latest.lock().await.clone()
    }

    async fn write(&self, key: &str, value: Value) -> Result<(), ChannelError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ChannelError::Rejected(String::from("memory channel is failing writes")));
        }

        self.writes.lock().await.push((key.to_string(), value.clone()));

        if self.echo.load(Ordering::SeqCst) {
            self.push(&format!("devices/{key}"), value).await;
        }

        Ok(())
    }
}
