pub mod commands;
pub mod controller;
pub mod engine;
pub mod format;
pub mod ledger;
pub mod state;

pub use controller::TimerController;
pub use engine::{LapView, TimerEngine, TimerSnapshot, UiAffordances};
pub use format::format_elapsed;
pub use ledger::{LapLedger, LapRecord, LapTags};
pub use state::{ClockState, TimerStatus};
