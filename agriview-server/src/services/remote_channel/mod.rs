#[cfg(any(test, feature = "mock"))]
mod memory;
mod mqtt;
mod tree;

use agriview_api::models::FarmData;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryChannel;
pub use mqtt::MqttChannel;
pub use tree::FarmTree;

use crate::errors::ChannelError;

/// Push-based key-value store holding one farm's `devices`, `sensorData` and `system`.
#[async_trait]
pub trait RemoteChannel: Send + Sync {
    fn farm_id(&self) -> &str;

    /// Every decoded snapshot, in the order the channel delivered them.
    fn subscribe(&self) -> broadcast::Receiver<FarmData>;

    async fn snapshot(&self) -> Option<FarmData>;

    /// Writes one device key. Not retried.
    async fn write(&self, key: &str, value: Value) -> Result<(), ChannelError>;
}
