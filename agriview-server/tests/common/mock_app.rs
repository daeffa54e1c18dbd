use std::sync::Arc;

use agriview_server::app::{AppServices, create_router};
use agriview_server::configs::{Advisor, Automation};
use agriview_server::services::{MemoryChannel, RemoteChannel};
use agriview_server::tests::*;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use tokio::task::JoinHandle;
use tower::ServiceExt;

pub struct MockApp {
    pub services: AppServices,
    pub channel: Arc<MemoryChannel>,
    pub router: Router,
}

#[allow(dead_code)]
impl MockApp {
    pub async fn new() -> Self {
        Self::with_settings(Automation::default(), Self::advisor(None)).await
    }

    pub async fn with_settings(automation: Automation, advisor: Advisor) -> Self {
        let storage = setup_test_db().await;
        let channel = create_test_channel();
        let remote: Arc<dyn RemoteChannel> = channel.clone();

        let services = AppServices::new(storage, remote, &automation, advisor)
            .await
            .unwrap();
        let router = create_router(&services);

        Self {
            services,
            channel,
            router,
        }
    }

    /// Advisor settings, configured only when an endpoint is given.
    pub fn advisor(endpoint: Option<String>) -> Advisor {
        Advisor {
            endpoint: endpoint.clone().unwrap_or_else(|| String::from("http://127.0.0.1:9")),
            model: String::from("gemini-2.0-flash"),
            api_key: endpoint.map(|_| String::from("test-key")),
            timeout_secs: 5,
        }
    }

    pub fn start_automation(&self) -> JoinHandle<()> {
        self.services.automation_service().start()
    }

    /// Feeds the current channel snapshot through the automation listener once.
    pub async fn sync(&self) {
        if let Some(snapshot) = self.channel.snapshot().await {
            self.services
                .automation_service()
                .handle_snapshot(snapshot)
                .await;
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .method(method)
            .header("Content-Type", "application/json")
            .body(match body {
                Some(body) => Body::from(serde_json::to_string(&body).unwrap()),
                None => Body::empty(),
            })
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }
}
