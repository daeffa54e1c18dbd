use agriview_api::models::{FarmData, PanelView, RuleConflict};
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ServiceEvent {
    Snapshot(FarmData),
    Panel(PanelView),
    Automation { enabled: bool },
    Conflict(RuleConflict),
    Error { message: String },
}

impl ServiceEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            ServiceEvent::Snapshot(_) => "snapshot",
            ServiceEvent::Panel(_) => "panel",
            ServiceEvent::Automation { .. } => "automation",
            ServiceEvent::Conflict(_) => "conflict",
            ServiceEvent::Error { .. } => "error",
        }
    }
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServiceEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);

        Self { sender }
    }

    pub fn publish(&self, event: ServiceEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("no event subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServiceEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
