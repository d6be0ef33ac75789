use std::time::Duration;

use tokio::sync::mpsc::Sender;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Tick emitted by the auto-shuffle timer, tagged with the generation that
/// started it so a tick already queued when the timer stops is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleTick {
    pub generation: u64,
}

/// Cancellable periodic timer driving grid refreshes.
///
/// At most one timer runs at a time: starting while active and stopping while
/// inactive are no-ops. After `stop` returns, `accepts` rejects every tick the
/// stopped timer may still have in flight.
pub struct AutoShuffle {
    period: Duration,
    ticks: Sender<ShuffleTick>,
    parent: CancellationToken,
    timer: Option<CancellationToken>,
    generation: u64,
}

impl AutoShuffle {
    pub fn new(period: Duration, ticks: Sender<ShuffleTick>, parent: CancellationToken) -> Self {
        Self {
            period,
            ticks,
            parent,
            timer: None,
            generation: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }
        self.generation += 1;
        let token = self.parent.child_token();
        let ticks = self.ticks.clone();
        let generation = self.generation;
        let period = self.period;
        tokio::spawn({
            let token = token.clone();
            async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                // the first interval tick completes immediately; the grid was
                // just refreshed, so swallow it
                interval.tick().await;
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = interval.tick() => {
                            if ticks.send(ShuffleTick { generation }).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });
        self.timer = Some(token);
        info!(period = ?self.period, "auto-shuffle started");
    }

    pub fn stop(&mut self) {
        let Some(token) = self.timer.take() else {
            return;
        };
        token.cancel();
        // invalidate ticks the timer already queued before it saw the cancel
        self.generation += 1;
        info!("auto-shuffle stopped");
    }

    /// Flip between running and stopped; returns whether the timer is now active.
    pub fn toggle(&mut self) -> bool {
        if self.is_active() {
            self.stop();
        } else {
            self.start();
        }
        self.is_active()
    }

    /// Whether a received tick belongs to the currently running timer.
    pub fn accepts(&self, tick: ShuffleTick) -> bool {
        let current = self.timer.is_some() && tick.generation == self.generation;
        if !current {
            debug!(generation = tick.generation, "discarding stale auto-shuffle tick");
        }
        current
    }
}
