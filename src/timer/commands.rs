use anyhow::{anyhow, bail, Result};

use super::TimerController;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

pub const HELP: &str = "\
commands:
  <enter> | space | s | t   start / pause
  l                         lap
  r                         reset
  d <n> | delete <n>        delete lap n
  c                         clear laps
  e                         export laps to CSV
  h | ?                     this help
  q                         quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Lap,
    Reset,
    DeleteLap(usize),
    ClearLaps,
    Export,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim().to_ascii_lowercase();
        let mut parts = line.split_whitespace();
        let head = parts.next().unwrap_or("");
        let arg = parts.next();

        let command = match head {
            "" | "space" | "s" | "t" => Command::Toggle,
            "l" | "lap" => Command::Lap,
            "r" | "reset" => Command::Reset,
            "c" | "clear" => Command::ClearLaps,
            "e" | "export" => Command::Export,
            "h" | "?" | "help" => Command::Help,
            "q" | "quit" => Command::Quit,
            "d" | "delete" => {
                let raw = arg.ok_or_else(|| anyhow!("delete needs a lap number"))?;
                let index = raw
                    .parse::<usize>()
                    .map_err(|_| anyhow!("invalid lap number '{raw}'"))?;
                return Ok(Command::DeleteLap(index));
            }
            other => bail!("unknown command '{other}'"),
        };

        if arg.is_some() {
            bail!("'{head}' takes no arguments");
        }
        Ok(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Routes a command to the controller. Disabled commands are logged and
/// still forwarded; the engine ignores them on its own.
pub async fn dispatch(controller: &TimerController, command: Command) -> Flow {
    let affordances = controller.get_snapshot().await.affordances;
    let enabled = match command {
        Command::Lap => affordances.can_lap,
        Command::Reset => affordances.can_reset,
        Command::DeleteLap(_) | Command::ClearLaps => affordances.can_clear,
        Command::Export => affordances.can_export,
        Command::Toggle | Command::Help | Command::Quit => true,
    };
    if !enabled {
        log::debug!("{command:?} is currently disabled");
    }

    match command {
        Command::Toggle => {
            let status = controller.toggle().await;
            log_info!("clock is now {status:?}");
        }
        Command::Lap => {
            controller.lap().await;
        }
        Command::Reset => controller.reset().await,
        Command::DeleteLap(index) => {
            controller.delete_lap(index).await;
        }
        Command::ClearLaps => {
            controller.clear_laps().await;
        }
        Command::Export => {
            if let Err(err) = controller.export().await {
                log_error!("export failed: {err:#}");
                eprintln!("export failed: {err:#}");
            }
        }
        Command::Help => eprintln!("{HELP}"),
        Command::Quit => return Flow::Quit,
    }
    Flow::Continue
}
