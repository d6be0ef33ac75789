use std::io::{self, BufRead, IsTerminal};

use anyhow::Result;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::events::GridCommand;

/// Map one input line to a grid command, mirroring the page's keyboard
/// shortcuts: `r`/`R` refresh, `l` auto-shuffle toggle, `p <cell>` pin
/// toggle, `+`/`-` grid size.
pub fn parse_command(line: &str) -> Option<GridCommand> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "r" => Some(GridCommand::Refresh { force: false }),
        "R" => Some(GridCommand::Refresh { force: true }),
        "l" => Some(GridCommand::ToggleAutoShuffle),
        "p" => parts
            .next()?
            .parse()
            .ok()
            .map(|cell| GridCommand::TogglePinned { cell }),
        "+" | "=" => Some(GridCommand::GrowGrid),
        "-" | "_" => Some(GridCommand::ShrinkGrid),
        _ => None,
    }
}

/// Reads command lines from stdin until EOF or `q`, which shuts the
/// pipeline down.
pub async fn run(to_manager: Sender<GridCommand>, cancel: CancellationToken) -> Result<()> {
    if !io::stdin().is_terminal() {
        debug!("stdin is not a terminal; skipping command reader");
        return Ok(());
    }
    let handle = tokio::task::spawn_blocking(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if cancel.is_cancelled() {
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "q" {
                cancel.cancel();
                break;
            }
            match parse_command(line) {
                Some(cmd) => {
                    if to_manager.blocking_send(cmd).is_err() {
                        break;
                    }
                }
                None => warn!(input = %line, "unrecognized command"),
            }
        }
    });
    handle.await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_shortcuts() {
        assert_eq!(parse_command("r"), Some(GridCommand::Refresh { force: false }));
        assert_eq!(parse_command("R"), Some(GridCommand::Refresh { force: true }));
        assert_eq!(parse_command("l"), Some(GridCommand::ToggleAutoShuffle));
        assert_eq!(parse_command("p 3"), Some(GridCommand::TogglePinned { cell: 3 }));
        assert_eq!(parse_command("+"), Some(GridCommand::GrowGrid));
        assert_eq!(parse_command("-"), Some(GridCommand::ShrinkGrid));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_command("x"), None);
        assert_eq!(parse_command("p"), None);
        assert_eq!(parse_command("p many"), None);
        assert_eq!(parse_command(""), None);
    }
}
