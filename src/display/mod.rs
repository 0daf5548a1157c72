pub mod json;
pub mod terminal;

pub use json::JsonLinesSink;
pub use terminal::TerminalSink;

use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use crate::timer::{LapView, TimerStatus, UiAffordances};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TimerEvent {
    #[serde(rename_all = "camelCase")]
    TimerTick { formatted: String, elapsed_ms: f64 },
    #[serde(rename_all = "camelCase")]
    TimerStateChanged {
        session_id: Option<Uuid>,
        status: TimerStatus,
        elapsed_ms: f64,
        formatted: String,
        affordances: UiAffordances,
    },
    #[serde(rename_all = "camelCase")]
    LapsChanged { laps: Vec<LapView> },
    #[serde(rename_all = "camelCase")]
    LapsExported {
        session_id: Option<Uuid>,
        path: PathBuf,
        rows: usize,
    },
}

/// Receives every display update. Implementations must not call back into
/// the controller.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &TimerEvent);
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tags_and_field_names() {
        let event = TimerEvent::TimerTick {
            formatted: "00:00:01.00".into(),
            elapsed_ms: 1000.0,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "timer-tick");
        assert_eq!(value["elapsedMs"], 1000.0);

        let event = TimerEvent::LapsChanged { laps: Vec::new() };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "laps-changed");
        assert!(value["laps"].as_array().unwrap().is_empty());
    }
}
