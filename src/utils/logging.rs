//! Logger setup and conditional logging macros gated on a module-level
//! `ENABLE_LOGS` flag.
//!
//! Usage:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_info, log_warn, log_error};
//!
//! log_info!("lap {} recorded", 3);
//! ```

pub const DEBUG_ENV: &str = "LAPWATCH_DEBUG";

/// Logs go to stderr so they never interleave with the clock on stdout.
/// `RUST_LOG` overrides the default `warn` level; `LAPWATCH_DEBUG=1` forces debug.
pub fn init_logging() {
    let debug_mode = std::env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .target(env_logger::Target::Stderr);
    if debug_mode {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // A second init (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
}

/// Info logging when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Warn logging when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Error logging when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
