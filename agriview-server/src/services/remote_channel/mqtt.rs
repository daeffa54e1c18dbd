use std::sync::Arc;
use std::time::Duration;
use std::{fs, io};

use agriview_api::models::FarmData;
use anyhow::anyhow;
use async_trait::async_trait;
use rumqttc::tokio_rustls::rustls::{ClientConfig, RootCertStore};
use rumqttc::{
    AsyncClient, Event, EventLoop, MqttOptions, Packet, Publish, QoS, TlsConfiguration, Transport,
};
use rustls_pemfile::{Item, certs, read_one};
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

use super::{FarmTree, RemoteChannel};
use crate::configs::{Gateway, GatewayAuth};
use crate::errors::ChannelError;

const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Remote channel backed by retained MQTT topics under `{topic_root}/{farm_id}`.
pub struct MqttChannel {
    client: AsyncClient,
    farm_id: String,
    prefix: String,
    write_timeout: Duration,
    tree: Arc<RwLock<FarmTree>>,
    latest: Arc<RwLock<Option<FarmData>>>,
    sender: broadcast::Sender<FarmData>,
}

impl MqttChannel {
    /// Creates the client and spawns its event loop.
    pub fn connect(gateway: &Gateway) -> Result<Arc<Self>, anyhow::Error> {
        let mut options = MqttOptions::new(&gateway.client_id, &gateway.host, gateway.port);
        options.set_keep_alive(Duration::from_secs(gateway.keep_alive_secs));

        if let Some(auth) = &gateway.auth {
            options.set_transport(Transport::Tls(TlsConfiguration::from(Self::tls_config(auth)?)));
        }

        let (client, event_loop) = AsyncClient::new(options, 10);
        let (sender, _) = broadcast::channel(100);

        let channel = Arc::new(Self {
            client,
            farm_id: gateway.farm_id.clone(),
            prefix: format!("{}/{}", gateway.topic_root, gateway.farm_id),
            write_timeout: Duration::from_millis(gateway.write_timeout_ms),
            tree: Arc::new(RwLock::new(FarmTree::new())),
            latest: Arc::new(RwLock::new(None)),
            sender,
        });

        channel.clone().spawn_event_loop(event_loop);

        Ok(channel)
    }

    fn tls_config(auth: &GatewayAuth) -> Result<ClientConfig, anyhow::Error> {
        let mut root_cert_store = RootCertStore::empty();
        root_cert_store.add_parsable_certificates(rustls_native_certs::load_native_certs()?);

        let certs = certs(&mut io::BufReader::new(fs::File::open(&auth.cert_path)?))
            .collect::<Result<Vec<_>, _>>()?;
        let mut key_buffer = io::BufReader::new(fs::File::open(&auth.key_path)?);
        let key = loop {
            match read_one(&mut key_buffer)? {
                Some(Item::Sec1Key(key)) => break key.into(),
                Some(Item::Pkcs1Key(key)) => break key.into(),
                Some(Item::Pkcs8Key(key)) => break key.into(),
                None => return Err(anyhow!("no keys found or encrypted keys not supported")),
                _ => {}
            }
        };

        Ok(ClientConfig::builder()
            .with_root_certificates(root_cert_store)
            .with_client_auth_cert(certs, key)?)
    }

    fn spawn_event_loop(self: Arc<Self>, mut event_loop: EventLoop) -> JoinHandle<()> {
        let filter = format!("{}/#", self.prefix);

        tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        // the event loop is blocked here, so only queue the request
                        match self.client.try_subscribe(&filter, QoS::AtLeastOnce) {
                            Ok(()) => tracing::info!("subscribe topic {}", filter),
                            Err(e) => tracing::error!("Failed to subscribe {}: {}", filter, e),
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        self.handle_publish(&publish).await;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!("MQTT error: {}", e);
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        })
    }

    async fn handle_publish(&self, publish: &Publish) {
        let Some(path) = self.topic_path(&publish.topic) else {
            tracing::debug!("ignoring foreign topic {}", publish.topic);
            return;
        };

        let value = if publish.payload.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice::<Value>(&publish.payload) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Malformed payload on {}: {}", publish.topic, e);
                    return;
                }
            }
        };

        tracing::debug!("Receive {}: {}", publish.topic, value);

        let snapshot = {
            let mut tree = self.tree.write().await;
            tree.set(&path, value);
            tree.decode()
        };

        *self.latest.write().await = Some(snapshot.clone());

        if self.sender.send(snapshot).is_err() {
            tracing::trace!("no snapshot subscribers");
        }
    }

    fn topic_path<'a>(&self, topic: &'a str) -> Option<Vec<&'a str>> {
        let rest = topic.strip_prefix(self.prefix.as_str())?;

        if rest.is_empty() {
            return Some(Vec::new());
        }

        Some(rest.strip_prefix('/')?.split('/').filter(|s| !s.is_empty()).collect())
    }
}

#[async_trait]
impl RemoteChannel for MqttChannel {
    fn farm_id(&self) -> &str {
        &self.farm_id
    }

    fn subscribe(&self) -> broadcast::Receiver<FarmData> {
        self.sender.subscribe()
    }

    async fn snapshot(&self) -> Option<FarmData> {
        self.latest.read().await.clone()
    }

    async fn write(&self, key: &str, value: Value) -> Result<(), ChannelError> {
        let topic = format!("{}/devices/{}", self.prefix, key);
        let payload = value.to_string();

        tracing::debug!("Publish {}: {}", topic, payload);

        match tokio::time::timeout(
            self.write_timeout,
            self.client.publish(&topic, QoS::AtLeastOnce, true, payload),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ChannelError::Rejected(e.to_string())),
            Err(_) => Err(ChannelError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> Gateway {
        Gateway {
            host: String::from("127.0.0.1"),
            port: 1883,
            client_id: String::from("agriview-test"),
            farm_id: String::from("farm-1"),
            topic_root: String::from("farms"),
            keep_alive_secs: 5,
            write_timeout_ms: 50,
            auth: None,
        }
    }

    #[tokio::test]
    async fn test_topic_path() {
        let channel = MqttChannel::connect(&gateway()).unwrap();

        assert_eq!(channel.topic_path("farms/farm-1/devices/pump"), Some(vec!["devices", "pump"]));
        assert_eq!(channel.topic_path("farms/farm-1"), Some(vec![]));
        assert_eq!(channel.topic_path("farms/farm-10/devices"), None);
        assert_eq!(channel.topic_path("farms/other/devices"), None);
    }

    #[tokio::test]
    async fn test_publish_updates_snapshot() {
        let channel = MqttChannel::connect(&gateway()).unwrap();
        let mut receiver = channel.subscribe();

        let publish = Publish::new("farms/farm-1/sensorData/temperature", QoS::AtLeastOnce, "12.5");
        channel.handle_publish(&publish).await;

        let snapshot = receiver.recv().await.unwrap();
        assert_eq!(snapshot.sensor_data.unwrap().temperature, Some(12.5));
        assert!(channel.snapshot().await.is_some());
    }

    #[tokio::test]
    async fn test_malformed_payload_is_dropped() {
        let channel = MqttChannel::connect(&gateway()).unwrap();

        let publish = Publish::new("farms/farm-1/devices/pump", QoS::AtLeastOnce, "{not json");
        channel.handle_publish(&publish).await;

        assert!(channel.snapshot().await.is_none());
    }
}
