use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const SETTINGS_ENV: &str = "LAPWATCH_SETTINGS";
const DEFAULT_SETTINGS_FILE: &str = "lapwatch.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum OutputMode {
    Terminal,
    Json,
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Terminal
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Display refresh cadence; 16ms is roughly one frame at 60Hz.
    pub refresh_interval_ms: u64,
    pub export_dir: PathBuf,
    pub output: OutputMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 16,
            export_dir: PathBuf::from("."),
            output: OutputMode::Terminal,
        }
    }
}

impl Settings {
    /// Missing file means defaults. A file that exists but does not parse is
    /// reported and replaced by defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        match serde_json::from_str(&contents) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!("Ignoring malformed settings in {}: {err}", path.display());
                Ok(Self::default())
            }
        }
    }

    pub fn default_path() -> PathBuf {
        std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }
}
