use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use super::{format_elapsed, ClockState, LapLedger, LapRecord, TimerStatus};

/// Which commands are currently meaningful. Recomputed after every mutation.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UiAffordances {
    pub can_lap: bool,
    pub can_reset: bool,
    pub can_clear: bool,
    pub can_export: bool,
}

impl UiAffordances {
    pub fn from_engine(engine: &TimerEngine) -> Self {
        let started = engine.clock.has_started();
        let has_laps = !engine.ledger.is_empty();
        Self {
            can_lap: started,
            can_reset: started,
            can_clear: has_laps,
            can_export: has_laps,
        }
    }
}

/// One row of the lap list as handed to the display.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LapView {
    pub index: usize,
    pub time_ms: f64,
    pub delta_ms: f64,
    pub formatted_time: String,
    pub formatted_delta: String,
    pub fastest: bool,
    pub slowest: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub elapsed_ms: f64,
    pub formatted: String,
    /// Newest first.
    pub laps: Vec<LapView>,
    pub affordances: UiAffordances,
}

/// Clock accumulator plus lap ledger. Every operation is a synchronous
/// transition; the ones returning `bool` report whether anything changed.
#[derive(Debug, Clone, Default)]
pub struct TimerEngine {
    clock: ClockState,
    ledger: LapLedger,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TimerStatus {
        self.clock.status()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn ledger(&self) -> &LapLedger {
        &self.ledger
    }

    pub fn current_elapsed_ms(&self, now: Instant) -> f64 {
        self.clock.current_elapsed_ms(now)
    }

    pub fn affordances(&self) -> UiAffordances {
        UiAffordances::from_engine(self)
    }

    pub fn start(&mut self, now: Instant) -> bool {
        self.clock.start(now)
    }

    pub fn pause(&mut self, now: Instant) -> bool {
        self.clock.pause(now)
    }

    pub fn toggle(&mut self, now: Instant) -> TimerStatus {
        self.clock.toggle(now)
    }

    /// Clock and ledger are cleared together.
    pub fn reset(&mut self, now: Instant) {
        self.clock.reset(now);
        self.ledger.clear();
    }

    /// No-op until the clock has been started since the last reset.
    pub fn record_lap(&mut self, now: Instant, recorded_at: DateTime<Utc>) -> Option<&LapRecord> {
        if !self.clock.has_started() {
            return None;
        }
        let time_ms = self.clock.current_elapsed_ms(now);
        Some(self.ledger.record_lap(time_ms, recorded_at))
    }

    pub fn delete_lap(&mut self, index: usize) -> bool {
        self.ledger.delete_lap(index).is_some()
    }

    pub fn clear_laps(&mut self) -> bool {
        self.ledger.clear() > 0
    }

    pub fn lap_views(&self) -> Vec<LapView> {
        let tags = self.ledger.fastest_and_slowest();
        self.ledger
            .iter()
            .zip(tags)
            .rev()
            .map(|(lap, tag)| LapView {
                index: lap.index,
                time_ms: lap.time_ms,
                delta_ms: lap.delta_ms,
                formatted_time: format_elapsed(lap.time_ms),
                formatted_delta: format_elapsed(lap.delta_ms),
                fastest: tag.fastest,
                slowest: tag.slowest,
            })
            .collect()
    }

    pub fn snapshot(&self, now: Instant) -> TimerSnapshot {
        let elapsed_ms = self.current_elapsed_ms(now);
        TimerSnapshot {
            status: self.status(),
            elapsed_ms,
            formatted: format_elapsed(elapsed_ms),
            laps: self.lap_views(),
            affordances: self.affordances(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn at(origin: Instant, ms: u64) -> Instant {
        origin + Duration::from_millis(ms)
    }

    #[test]
    fn test_lap_scenario() {
        let t0 = Instant::now();
        let mut engine = TimerEngine::new();
        engine.start(t0);

        let lap = engine.record_lap(at(t0, 1500), Utc::now()).cloned().unwrap();
        assert_eq!((lap.index, lap.time_ms, lap.delta_ms), (1, 1500.0, 1500.0));

        let lap = engine.record_lap(at(t0, 4200), Utc::now()).cloned().unwrap();
        assert_eq!((lap.index, lap.time_ms, lap.delta_ms), (2, 4200.0, 2700.0));

        engine.pause(at(t0, 4200));
        assert_eq!(engine.current_elapsed_ms(at(t0, 9000)), 4200.0);

        engine.reset(at(t0, 9000));
        assert!(engine.ledger().is_empty());
        assert_eq!(engine.current_elapsed_ms(at(t0, 9500)), 0.0);
        assert_eq!(engine.status(), TimerStatus::Idle);
    }

    #[test]
    fn test_lap_before_start_is_noop() {
        let t0 = Instant::now();
        let mut engine = TimerEngine::new();
        assert!(engine.record_lap(t0, Utc::now()).is_none());
        assert!(engine.ledger().is_empty());
    }

    #[test]
    fn test_lap_while_paused_uses_frozen_time() {
        let t0 = Instant::now();
        let mut engine = TimerEngine::new();
        engine.start(t0);
        engine.pause(at(t0, 2000));
        let lap = engine.record_lap(at(t0, 7000), Utc::now()).cloned().unwrap();
        assert_eq!(lap.time_ms, 2000.0);
    }

    #[test]
    fn test_lap_after_reset_is_noop_again() {
        let t0 = Instant::now();
        let mut engine = TimerEngine::new();
        engine.start(t0);
        engine.reset(at(t0, 100));
        assert!(engine.record_lap(at(t0, 200), Utc::now()).is_none());
    }

    #[test]
    fn test_reset_from_any_state() {
        let t0 = Instant::now();

        let mut idle = TimerEngine::new();
        idle.reset(t0);
        assert_eq!(idle.current_elapsed_ms(t0), 0.0);

        let mut running = TimerEngine::new();
        running.start(t0);
        running.record_lap(at(t0, 10), Utc::now());
        running.reset(at(t0, 50));
        assert_eq!(running.current_elapsed_ms(at(t0, 60)), 0.0);
        assert!(running.ledger().is_empty());
    }

    #[test]
    fn test_guards_on_empty_ledger() {
        let mut engine = TimerEngine::new();
        assert!(!engine.delete_lap(1));
        assert!(!engine.clear_laps());
    }

    #[test]
    fn test_affordances_follow_state() {
        let t0 = Instant::now();
        let mut engine = TimerEngine::new();
        assert_eq!(engine.affordances(), UiAffordances::default());

        engine.start(t0);
        assert_eq!(
            engine.affordances(),
            UiAffordances {
                can_lap: true,
                can_reset: true,
                can_clear: false,
                can_export: false,
            }
        );

        engine.record_lap(at(t0, 10), Utc::now());
        engine.pause(at(t0, 20));
        let affordances = engine.affordances();
        assert!(affordances.can_lap && affordances.can_clear && affordances.can_export);

        engine.clear_laps();
        assert!(!engine.affordances().can_export);

        engine.reset(at(t0, 30));
        assert_eq!(engine.affordances(), UiAffordances::default());
    }

    #[test]
    fn test_lap_views_newest_first_with_tags() {
        let t0 = Instant::now();
        let mut engine = TimerEngine::new();
        engine.start(t0);
        for ms in [1000, 1500, 3500] {
            engine.record_lap(at(t0, ms), Utc::now());
        }

        let views = engine.lap_views();
        let order: Vec<usize> = views.iter().map(|view| view.index).collect();
        assert_eq!(order, vec![3, 2, 1]);

        assert!(views[0].slowest && !views[0].fastest);
        assert!(views[1].fastest && !views[1].slowest);
        assert!(!views[2].fastest && !views[2].slowest);
        assert_eq!(views[0].formatted_delta, "00:00:02.00");
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let t0 = Instant::now();
        let mut engine = TimerEngine::new();
        engine.start(t0);
        let value = serde_json::to_value(engine.snapshot(at(t0, 61_234))).unwrap();
        assert_eq!(value["status"], "running");
        assert_eq!(value["formatted"], "00:01:01.23");
        assert_eq!(value["affordances"]["canLap"], true);
    }
}
