use std::{
    io::{self, Write},
    sync::Mutex,
};

use super::{EventSink, TimerEvent};
use crate::timer::{LapView, UiAffordances};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Redraws the clock on a single line and prints the lap table whenever it
/// changes.
pub struct TerminalSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalSink {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write(&self, text: &str) {
        let mut guard = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = guard.write_all(text.as_bytes()).and_then(|_| guard.flush()) {
            log_warn!("terminal write failed: {err}");
        }
    }
}

impl EventSink for TerminalSink {
    fn emit(&self, event: &TimerEvent) {
        match event {
            TimerEvent::TimerTick { formatted, .. } => {
                self.write(&format!("\r{formatted}"));
            }
            TimerEvent::TimerStateChanged {
                status,
                formatted,
                affordances,
                ..
            } => {
                self.write(&format!(
                    "\r{formatted}  [{status:?}] {}\n",
                    render_affordances(affordances)
                ));
            }
            TimerEvent::LapsChanged { laps } => {
                self.write(&render_laps(laps));
            }
            TimerEvent::LapsExported { path, rows, .. } => {
                self.write(&format!("exported {rows} laps to {}\n", path.display()));
            }
        }
    }
}

fn render_affordances(affordances: &UiAffordances) -> String {
    let mut keys = vec!["[space] start/pause"];
    if affordances.can_lap {
        keys.push("[l] lap");
    }
    if affordances.can_reset {
        keys.push("[r] reset");
    }
    if affordances.can_clear {
        keys.push("[d n] delete  [c] clear");
    }
    if affordances.can_export {
        keys.push("[e] export");
    }
    keys.push("[q] quit");
    keys.join("  ")
}

/// Rows arrive newest first and are printed in that order.
pub fn render_laps(laps: &[LapView]) -> String {
    if laps.is_empty() {
        return "no laps\n".to_string();
    }

    let mut out = String::from("  lap  time          delta\n");
    for lap in laps {
        let tag = match (lap.fastest, lap.slowest) {
            (true, true) => "  fastest slowest",
            (true, false) => "  fastest",
            (false, true) => "  slowest",
            (false, false) => "",
        };
        out.push_str(&format!(
            "  {:>3}  {}  +{}{}\n",
            lap.index, lap.formatted_time, lap.formatted_delta, tag
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn view(index: usize, fastest: bool, slowest: bool) -> LapView {
        LapView {
            index,
            time_ms: 0.0,
            delta_ms: 0.0,
            formatted_time: "00:00:01.00".into(),
            formatted_delta: "00:00:00.50".into(),
            fastest,
            slowest,
        }
    }

    #[test]
    fn test_tick_redraws_in_place() {
        let buf = SharedBuf::default();
        let sink = TerminalSink::new(Box::new(buf.clone()));
        sink.emit(&TimerEvent::TimerTick {
            formatted: "00:00:01.00".into(),
            elapsed_ms: 1000.0,
        });
        let written = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written, "\r00:00:01.00");
    }

    #[test]
    fn test_render_laps_marks_tags() {
        let table = render_laps(&[view(2, false, true), view(1, true, false)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].trim_start().starts_with('2'));
        assert!(lines[1].ends_with("slowest"));
        assert!(lines[2].ends_with("fastest"));
    }

    #[test]
    fn test_render_empty_laps() {
        assert_eq!(render_laps(&[]), "no laps\n");
    }

    #[test]
    fn test_render_affordances_hides_disabled_commands() {
        let text = render_affordances(&UiAffordances::default());
        assert!(!text.contains("lap"));
        assert!(!text.contains("export"));
        assert!(text.contains("start/pause"));
    }
}
