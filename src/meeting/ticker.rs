//! Cancellable periodic tick task.
//!
//! A `Ticker` is spawned when a meeting starts or resumes and cancelled when it
//! pauses or stops. Each ticker carries a generation number; ticks from a
//! cancelled ticker that are still queued can be recognised and dropped.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub generation: u64,
}

pub struct Ticker {
    generation: u64,
    cancel: CancellationToken,
}

impl Ticker {
    pub fn spawn(period: Duration, generation: u64, tx: mpsc::Sender<TickEvent>) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(TickEvent { generation }).await.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("Ticker generation {} finished", generation);
        });

        debug!("Ticker generation {} started ({:?})", generation, period);
        Self { generation, cancel }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(self) {
        self.cancel.cancel();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
