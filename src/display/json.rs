use std::{
    io::{self, Write},
    sync::Mutex,
};

use super::{EventSink, TimerEvent};

const ENABLE_LOGS: bool = true;

use crate::log_error;

/// One JSON object per line, for a front end driving the stopwatch over a pipe.
pub struct JsonLinesSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl JsonLinesSink {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl EventSink for JsonLinesSink {
    fn emit(&self, event: &TimerEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(err) => {
                log_error!("failed to serialize {event:?}: {err}");
                return;
            }
        };

        let mut guard = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = writeln!(guard, "{line}").and_then(|_| guard.flush()) {
            log_error!("failed to write event: {err}");
        }
    }
}
