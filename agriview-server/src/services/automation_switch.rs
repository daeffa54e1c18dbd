use tokio::sync::watch;

/// Process-wide flag gating every automated write. Lives for the session only.
pub struct AutomationSwitch {
    sender: watch::Sender<bool>,
}

impl AutomationSwitch {
    pub fn new(initial: bool) -> Self {
        let (sender, _) = watch::channel(initial);

        Self { sender }
    }

    pub fn is_enabled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Returns whether the value changed.
    pub fn set(&self, enabled: bool) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == enabled {
                false
            } else {
                *current = enabled;
                true
            }
        });

        if changed {
            tracing::info!("global automation {}", if enabled { "enabled" } else { "disabled" });
        }

        changed
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&self) -> bool {
        let enabled = !self.is_enabled();
        self.set(enabled);
        enabled
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}
