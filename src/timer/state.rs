use serde::{Deserialize, Serialize};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    /// Never started since the last reset.
    Idle,
    Running,
    Paused,
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Idle
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClockState {
    status: TimerStatus,
    /// Time accumulated from earlier running windows; combines with
    /// `running_anchor` to compute the true elapsed duration.
    accumulated_ms: f64,
    running_anchor: Option<Instant>,
}

impl ClockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn has_started(&self) -> bool {
        self.status != TimerStatus::Idle
    }

    pub fn accumulated_ms(&self) -> f64 {
        self.accumulated_ms
    }

    pub fn current_elapsed_ms(&self, now: Instant) -> f64 {
        match (self.status, self.running_anchor) {
            (TimerStatus::Running, Some(anchor)) => {
                let window = now.saturating_duration_since(anchor);
                self.accumulated_ms + window.as_nanos() as f64 / 1_000_000.0
            }
            _ => self.accumulated_ms,
        }
    }

    /// Returns `true` when the clock transitioned into the running state.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_running() {
            return false;
        }
        self.running_anchor = Some(now);
        self.status = TimerStatus::Running;
        true
    }

    /// Returns `true` when the clock transitioned out of the running state.
    pub fn pause(&mut self, now: Instant) -> bool {
        if !self.is_running() {
            return false;
        }
        // Same formula as a live read, so the committed value matches what was displayed.
        self.accumulated_ms = self.current_elapsed_ms(now);
        self.running_anchor = None;
        self.status = TimerStatus::Paused;
        true
    }

    pub fn toggle(&mut self, now: Instant) -> TimerStatus {
        if self.is_running() {
            self.pause(now);
        } else {
            self.start(now);
        }
        self.status
    }

    /// Returns `true` when a running interval was in flight and got discarded.
    pub fn reset(&mut self, now: Instant) -> bool {
        let was_running = self.pause(now);
        *self = Self::default();
        was_running
    }
}
