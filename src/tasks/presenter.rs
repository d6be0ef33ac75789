use anyhow::Result;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::events::CellUpdate;

/// Minimal output surface: logs each cell assignment or clear. A real
/// presenter would hand the playable references to video elements instead.
pub async fn run(mut updates_rx: Receiver<Vec<CellUpdate>>, cancel: CancellationToken) -> Result<()> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            maybe_batch = updates_rx.recv() => {
                let Some(batch) = maybe_batch else { break };
                for update in batch {
                    match update.assignment {
                        Some(assignment) => info!(
                            cell = update.cell,
                            key = %assignment.key,
                            uri = %assignment.uri,
                            "cell assigned"
                        ),
                        None => info!(cell = update.cell, "cell cleared"),
                    }
                }
            }
        }
    }
    Ok(())
}
