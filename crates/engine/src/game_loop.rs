//! Fixed-rate driver for [`App::tick`].

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::app::App;

/// One simulation tick.
pub const TICK: Duration = Duration::from_millis(50);

pub struct GameLoop {
    app: Arc<App>,
    period: Duration,
}

impl GameLoop {
    pub fn new(app: Arc<App>) -> Self {
        Self { app, period: TICK }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Tick until `cancel` fires. Returns the number of ticks run.
    ///
    /// Late ticks are skipped rather than replayed in a burst.
    pub async fn run(self, cancel: CancellationToken) -> u64 {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        tracing::info!(period_ms = self.period.as_millis() as u64, "Game loop started");
        let mut ticks = 0u64;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let report = self.app.tick().await;
                    ticks += 1;
                    if report.expired_invites > 0 {
                        tracing::debug!(
                            expired = report.expired_invites,
                            tick = ticks,
                            "Expired pending invites"
                        );
                    }
                }
            }
        }
        tracing::info!(ticks, "Game loop stopped");
        ticks
    }
}
