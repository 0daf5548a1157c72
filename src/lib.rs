pub mod display;
pub mod export;
pub mod settings;
pub mod timer;
pub mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use display::{EventSink, JsonLinesSink, TerminalSink};
use export::DirectoryExportSink;
use settings::{OutputMode, Settings};
use timer::{
    commands::{dispatch, Command, Flow, HELP},
    TimerController,
};

pub fn run() -> Result<()> {
    utils::logging::init_logging();

    let settings_path = Settings::default_path();
    let settings = Settings::load(&settings_path)?;
    info!("lapwatch starting with settings from {}", settings_path.display());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(run_session(settings))
}

/// Owns the controller for the lifetime of one stdin session.
pub async fn run_session(settings: Settings) -> Result<()> {
    let events: Arc<dyn EventSink> = match settings.output {
        OutputMode::Terminal => Arc::new(TerminalSink::stdout()),
        OutputMode::Json => Arc::new(JsonLinesSink::stdout()),
    };
    let exporter = DirectoryExportSink::new(settings.export_dir.clone());
    info!("exports go to {}", exporter.dir().display());

    let controller = TimerController::new(events, Arc::new(exporter), settings.refresh_interval());

    if settings.output == OutputMode::Terminal {
        eprintln!("{HELP}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read command")? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                warn!("{err}");
                eprintln!("{err} (h for help)");
                continue;
            }
        };
        if dispatch(&controller, command).await == Flow::Quit {
            break;
        }
    }

    controller.shutdown().await;
    info!("lapwatch shutting down");
    Ok(())
}
