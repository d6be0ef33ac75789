use std::time::Duration;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::autoshuffle::{AutoShuffle, ShuffleTick};
use crate::events::{CellUpdate, GridCommand, PoolEvent};
use crate::sampler::GridSampler;

#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub grid_size: usize,
    pub auto_shuffle_interval: Duration,
    pub shuffle_seed: Option<u64>,
}

/// Owns the grid sampler and serializes everything that can mutate it: pool
/// replacements, user commands and auto-shuffle ticks. Each resulting batch
/// of cell updates goes to the presenter channel.
pub async fn run(
    mut pool_rx: Receiver<PoolEvent>,
    mut cmd_rx: Receiver<GridCommand>,
    to_presenter: Sender<Vec<CellUpdate>>,
    cancel: CancellationToken,
    options: ManagerOptions,
) -> Result<()> {
    let mut sampler = GridSampler::new(options.grid_size, options.shuffle_seed);
    let (tick_tx, mut tick_rx) = mpsc::channel::<ShuffleTick>(4);
    let mut auto = AutoShuffle::new(options.auto_shuffle_interval, tick_tx, cancel.clone());

    loop {
        let mut updates: Option<Vec<CellUpdate>> = None;
        select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting manager task");
                break;
            }

            Some(event) = pool_rx.recv() => match event {
                PoolEvent::Replaced(items) => {
                    info!(clips = items.len(), "clip pool replaced");
                    sampler.replace_pool(items);
                    updates = Some(sampler.refresh_grid(true));
                }
            },

            Some(cmd) = cmd_rx.recv() => {
                debug!(?cmd, "grid command");
                match cmd {
                    GridCommand::Refresh { force } => {
                        updates = Some(sampler.refresh_grid(force));
                    }
                    GridCommand::ToggleAutoShuffle => {
                        auto.toggle();
                    }
                    GridCommand::SetPinned { cell, pinned } => {
                        sampler.set_pinned(cell, pinned);
                    }
                    GridCommand::TogglePinned { cell } => {
                        sampler.toggle_pinned(cell);
                    }
                    GridCommand::GrowGrid => {
                        sampler.resize_grid(sampler.grid_size() + 1);
                        updates = Some(sampler.refresh_grid(false));
                    }
                    GridCommand::ShrinkGrid => {
                        if sampler.grid_size() > 1 {
                            sampler.resize_grid(sampler.grid_size() - 1);
                            updates = Some(sampler.refresh_grid(false));
                        }
                    }
                }
            },

            Some(tick) = tick_rx.recv() => {
                if auto.accepts(tick) {
                    updates = Some(sampler.refresh_grid(false));
                }
            }
        }

        if let Some(batch) = updates {
            if !batch.is_empty() && to_presenter.send(batch).await.is_err() {
                warn!("presenter channel closed");
                break;
            }
        }
    }

    Ok(())
}
