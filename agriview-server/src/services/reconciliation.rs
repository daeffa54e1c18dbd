use agriview_api::models::VentPhase;

/// A second write was requested for a field whose previous write has not returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteInFlight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderPhase {
    /// Showing the remote value.
    Idle,
    /// User input owns the display, nothing sent yet.
    Dragging { value: u8 },
    /// Sent, waiting for the remote value to catch up.
    CommittedPending { committed: u8 },
}

impl From<SliderPhase> for VentPhase {
    fn from(phase: SliderPhase) -> Self {
        match phase {
            SliderPhase::Idle => VentPhase::Idle,
            SliderPhase::Dragging { .. } => VentPhase::Dragging,
            SliderPhase::CommittedPending { .. } => VentPhase::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The value must be written to the remote channel.
    Write(u8),
    /// The remote already holds the value.
    Confirmed,
}

/// Display state of a continuous remote-backed control.
///
/// Once a value is committed the display never falls back to an older remote
/// value until the remote reports the committed one, or the write fails.
#[derive(Debug, Clone)]
pub struct SliderReconciler {
    phase: SliderPhase,
    remote: u8,
    in_flight: bool,
}

impl SliderReconciler {
    pub fn new(remote: u8) -> Self {
        Self {
            phase: SliderPhase::Idle,
            remote,
            in_flight: false,
        }
    }

    pub fn phase(&self) -> SliderPhase {
        self.phase
    }

    pub fn remote(&self) -> u8 {
        self.remote
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn display(&self) -> u8 {
        match self.phase {
            SliderPhase::Idle => self.remote,
            SliderPhase::Dragging { value } => value,
            SliderPhase::CommittedPending { committed } => committed,
        }
    }

    /// Starting or continuing a drag drops any pending commit.
    pub fn drag(&mut self, value: u8) {
        self.phase = SliderPhase::Dragging { value };
    }

    pub fn commit(&mut self, value: u8) -> Result<CommitOutcome, WriteInFlight> {
        if self.in_flight {
            return Err(WriteInFlight);
        }

        if value == self.remote {
            self.phase = SliderPhase::Idle;
            return Ok(CommitOutcome::Confirmed);
        }

        self.phase = SliderPhase::CommittedPending { committed: value };
        self.in_flight = true;

        Ok(CommitOutcome::Write(value))
    }

    /// The write was accepted. Confirmation still comes from the remote value.
    pub fn write_succeeded(&mut self) {
        self.in_flight = false;
    }

    /// Drops the pending commit and shows the remote value again.
    pub fn write_failed(&mut self) {
        self.in_flight = false;

        if let SliderPhase::CommittedPending { .. } = self.phase {
            self.phase = SliderPhase::Idle;
        }
    }

    pub fn on_remote(&mut self, value: u8) {
        self.remote = value;

        if let SliderPhase::CommittedPending { committed } = self.phase {
            if committed == value {
                self.phase = SliderPhase::Idle;
            }
        }
    }
}

/// Optimistic boolean control. Reverts to the pre-toggle value when the write fails.
#[derive(Debug, Clone)]
pub struct ToggleReconciler {
    value: bool,
    previous: Option<bool>,
}

impl ToggleReconciler {
    pub fn new(value: bool) -> Self {
        Self {
            value,
            previous: None,
        }
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn in_flight(&self) -> bool {
        self.previous.is_some()
    }

    pub fn begin(&mut self, value: bool) -> Result<(), WriteInFlight> {
        if self.in_flight() {
            return Err(WriteInFlight);
        }

        self.previous = Some(self.value);
        self.value = value;

        Ok(())
    }

    pub fn succeed(&mut self) {
        self.previous = None;
    }

    pub fn fail(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.value = previous;
        }
    }

    /// Ignored while a write is in flight.
    pub fn on_remote(&mut self, value: bool) {
        if !self.in_flight() {
            self.value = value;
        }
    }

    /// Sets the value outright, abandoning any write in flight.
    pub fn reset(&mut self, value: bool) {
        self.value = value;
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_remote_does_not_rubber_band() {
        let mut slider = SliderReconciler::new(45);

        slider.drag(60);
        slider.drag(90);
        assert_eq!(slider.commit(90), Ok(CommitOutcome::Write(90)));
        slider.write_succeeded();

        for _ in 0..3 {
            slider.on_remote(45);
            assert_eq!(slider.display(), 90);
            assert_eq!(slider.phase(), SliderPhase::CommittedPending { committed: 90 });
        }

        slider.on_remote(90);
        assert_eq!(slider.display(), 90);
        assert_eq!(slider.phase(), SliderPhase::Idle);
    }

    #[test]
    fn test_remote_ignored_while_dragging() {
        let mut slider = SliderReconciler::new(45);
        slider.drag(100);

        slider.on_remote(10);
        assert_eq!(slider.display(), 100);
        assert_eq!(slider.remote(), 10);
    }

    #[test]
    fn test_commit_of_remote_value_needs_no_write() {
        let mut slider = SliderReconciler::new(45);
        slider.drag(70);

        assert_eq!(slider.commit(45), Ok(CommitOutcome::Confirmed));
        assert_eq!(slider.phase(), SliderPhase::Idle);
        assert!(!slider.in_flight());
    }

    #[test]
    fn test_drag_discards_pending_commit() {
        let mut slider = SliderReconciler::new(45);
        slider.commit(90).unwrap();
        slider.write_succeeded();

        slider.drag(120);
        slider.on_remote(90);
        assert_eq!(slider.display(), 120);
        assert_eq!(slider.phase(), SliderPhase::Dragging { value: 120 });
    }

    #[test]
    fn test_failed_write_reverts_to_remote() {
        let mut slider = SliderReconciler::new(45);
        slider.commit(90).unwrap();

        assert_eq!(slider.commit(100), Err(WriteInFlight));

        slider.write_failed();
        assert_eq!(slider.display(), 45);
        assert_eq!(slider.phase(), SliderPhase::Idle);
        assert!(slider.commit(100).is_ok());
    }

    #[test]
    fn test_toggle_reverts_on_failure() {
        let mut pump = ToggleReconciler::new(false);

        pump.begin(true).unwrap();
        assert!(pump.value());
        assert_eq!(pump.begin(false), Err(WriteInFlight));

        pump.fail();
        assert!(!pump.value());
        assert!(!pump.in_flight());
    }

    #[test]
    fn test_toggle_ignores_remote_while_in_flight() {
        let mut fan = ToggleReconciler::new(false);
        fan.begin(true).unwrap();

        fan.on_remote(false);
        assert!(fan.value());

        fan.succeed();
        fan.on_remote(false);
        assert!(!fan.value());
    }

    #[test]
    fn test_reset_abandons_write_in_flight() {
        let mut auto = ToggleReconciler::new(true);
        auto.begin(false).unwrap();

        auto.reset(false);
        assert!(!auto.in_flight());

        // a late failure must not bring the abandoned value back
        auto.fail();
        assert!(!auto.value());
    }
}
