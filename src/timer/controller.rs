use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    display::{EventSink, TimerEvent},
    export::{export_file_name_now, export_rows, to_csv, ExportSink},
};

use super::{format_elapsed, TimerEngine, TimerSnapshot, TimerStatus};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

struct RefreshLoop {
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

struct ControllerInner {
    engine: TimerEngine,
    /// Minted when the clock leaves Idle, dropped on reset.
    session_id: Option<Uuid>,
    refresh: Option<RefreshLoop>,
}

/// Owns one engine, its refresh loop and its sinks. Every command goes
/// through here so the refresh loop always tracks the running state.
#[derive(Clone)]
pub struct TimerController {
    inner: Arc<Mutex<ControllerInner>>,
    events: Arc<dyn EventSink>,
    exporter: Arc<dyn ExportSink>,
    refresh_interval: Duration,
}

impl TimerController {
    pub fn new(
        events: Arc<dyn EventSink>,
        exporter: Arc<dyn ExportSink>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ControllerInner {
                engine: TimerEngine::new(),
                session_id: None,
                refresh: None,
            })),
            events,
            exporter,
            refresh_interval: refresh_interval.max(Duration::from_millis(1)),
        }
    }

    pub async fn get_snapshot(&self) -> TimerSnapshot {
        let guard = self.inner.lock().await;
        guard.engine.snapshot(Instant::now())
    }

    pub async fn session_id(&self) -> Option<Uuid> {
        self.inner.lock().await.session_id
    }

    pub async fn is_refreshing(&self) -> bool {
        self.inner.lock().await.refresh.is_some()
    }

    /// The single start/pause entry point used by both key and button.
    pub async fn toggle(&self) -> TimerStatus {
        let mut guard = self.inner.lock().await;
        let status = if guard.engine.is_running() {
            self.pause_locked(&mut guard);
            guard.engine.status()
        } else {
            self.start_locked(&mut guard);
            guard.engine.status()
        };
        self.emit_state_changed(&guard);
        status
    }

    pub async fn start(&self) -> bool {
        let mut guard = self.inner.lock().await;
        let changed = self.start_locked(&mut guard);
        if changed {
            self.emit_state_changed(&guard);
        }
        changed
    }

    pub async fn pause(&self) -> bool {
        let mut guard = self.inner.lock().await;
        let changed = self.pause_locked(&mut guard);
        if changed {
            self.emit_state_changed(&guard);
        }
        changed
    }

    pub async fn reset(&self) {
        let mut guard = self.inner.lock().await;
        self.pause_locked(&mut guard);
        guard.engine.reset(Instant::now());
        if let Some(session_id) = guard.session_id.take() {
            log_info!("session {session_id} reset");
        }
        self.emit_state_changed(&guard);
        self.emit_laps_changed(&guard);
    }

    pub async fn lap(&self) -> bool {
        let mut guard = self.inner.lock().await;
        let recorded = guard
            .engine
            .record_lap(Instant::now(), Utc::now())
            .map(|lap| (lap.index, lap.time_ms));

        match recorded {
            Some((index, time_ms)) => {
                log_info!("lap {index} at {}", format_elapsed(time_ms));
                self.emit_state_changed(&guard);
                self.emit_laps_changed(&guard);
                true
            }
            None => false,
        }
    }

    pub async fn delete_lap(&self, index: usize) -> bool {
        let mut guard = self.inner.lock().await;
        if !guard.engine.delete_lap(index) {
            return false;
        }
        self.emit_state_changed(&guard);
        self.emit_laps_changed(&guard);
        true
    }

    pub async fn clear_laps(&self) -> bool {
        let mut guard = self.inner.lock().await;
        if !guard.engine.clear_laps() {
            return false;
        }
        self.emit_state_changed(&guard);
        self.emit_laps_changed(&guard);
        true
    }

    /// Writes the ledger as CSV. `Ok(None)` when there is nothing to export.
    pub async fn export(&self) -> Result<Option<PathBuf>> {
        let (rows, session_id) = {
            let guard = self.inner.lock().await;
            (export_rows(guard.engine.ledger()), guard.session_id)
        };
        if rows.is_empty() {
            return Ok(None);
        }

        let file_name = export_file_name_now();
        let path = match self.exporter.deliver(&file_name, &to_csv(&rows)) {
            Ok(path) => path,
            Err(err) => {
                log_error!("export of {} laps failed: {err:#}", rows.len());
                return Err(err);
            }
        };

        log_info!("exported {} laps to {}", rows.len(), path.display());
        self.events.emit(&TimerEvent::LapsExported {
            session_id,
            path: path.clone(),
            rows: rows.len(),
        });
        Ok(Some(path))
    }

    /// Stops the refresh loop without touching engine state.
    pub async fn shutdown(&self) {
        let mut guard = self.inner.lock().await;
        Self::cancel_refresh(&mut guard);
    }

    fn start_locked(&self, guard: &mut ControllerInner) -> bool {
        if !guard.engine.start(Instant::now()) {
            return false;
        }
        if guard.session_id.is_none() {
            let session_id = Uuid::new_v4();
            log_info!("session {session_id} started");
            guard.session_id = Some(session_id);
        }
        self.spawn_refresh(guard);
        true
    }

    fn pause_locked(&self, guard: &mut ControllerInner) -> bool {
        if !guard.engine.pause(Instant::now()) {
            return false;
        }
        Self::cancel_refresh(guard);
        true
    }

    fn spawn_refresh(&self, guard: &mut ControllerInner) {
        // A loop left over from an earlier run means a transition was missed.
        Self::cancel_refresh(guard);

        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();
        let inner = self.inner.clone();
        let events = self.events.clone();
        let tick_interval = self.refresh_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let elapsed_ms = {
                            let guard = inner.lock().await;
                            if !guard.engine.is_running() {
                                break;
                            }
                            guard.engine.current_elapsed_ms(Instant::now())
                        };
                        events.emit(&TimerEvent::TimerTick {
                            formatted: format_elapsed(elapsed_ms),
                            elapsed_ms,
                        });
                    }
                }
            }
        });

        guard.refresh = Some(RefreshLoop {
            cancel_token,
            handle,
        });
    }

    fn cancel_refresh(guard: &mut ControllerInner) {
        if let Some(refresh) = guard.refresh.take() {
            refresh.cancel_token.cancel();
            refresh.handle.abort();
        }
    }

    fn emit_state_changed(&self, guard: &ControllerInner) {
        let elapsed_ms = guard.engine.current_elapsed_ms(Instant::now());
        self.events.emit(&TimerEvent::TimerStateChanged {
            session_id: guard.session_id,
            status: guard.engine.status(),
            elapsed_ms,
            formatted: format_elapsed(elapsed_ms),
            affordances: guard.engine.affordances(),
        });
    }

    fn emit_laps_changed(&self, guard: &ControllerInner) {
        self.events.emit(&TimerEvent::LapsChanged {
            laps: guard.engine.lap_views(),
        });
    }
}
