//! Meeting session orchestrator.
//!
//! Owns the tracker, the tick task and the post-stop pipeline
//! (persist → hook). A session lives inside the service loop, which feeds it
//! user commands and ticks one at a time.
//!
//! All dependencies are injected via constructor.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::{ConfigUpdate, MeetingConfig};
use super::error::TrackerError;
use super::post_meeting_hook::{MeetingResult, PostMeetingHook};
use super::sink::MeetingSink;
use super::status::TrackerStatusHandle;
use super::ticker::{TickEvent, Ticker};
use super::tracker::{MeetingSummary, MeetingTracker, TrackerSnapshot};

/// Result returned from stopping a meeting.
#[derive(Debug, Clone)]
pub struct MeetingStopResult {
    pub summary: MeetingSummary,
    /// Database ID, when the meeting was persisted.
    pub meeting_id: Option<i64>,
}

/// Cost of a pending edit next to the figures it was priced against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostPreview {
    pub total_cost: f64,
    pub current_total_cost: f64,
    pub elapsed_seconds: f64,
}

pub struct MeetingSession {
    tracker: MeetingTracker,
    ticker: Option<Ticker>,
    next_generation: u64,
    tick_interval: Duration,
    tick_tx: mpsc::Sender<TickEvent>,
    status: TrackerStatusHandle,
    sink: Option<Box<dyn MeetingSink>>,
    hook: Option<Arc<dyn PostMeetingHook>>,
}

impl MeetingSession {
    pub fn new(
        tracker: MeetingTracker,
        tick_interval: Duration,
        tick_tx: mpsc::Sender<TickEvent>,
        status: TrackerStatusHandle,
        sink: Option<Box<dyn MeetingSink>>,
        hook: Option<Arc<dyn PostMeetingHook>>,
    ) -> Self {
        Self {
            tracker,
            ticker: None,
            next_generation: 0,
            tick_interval,
            tick_tx,
            status,
            sink,
            hook,
        }
    }

    pub fn tracker(&self) -> &MeetingTracker {
        &self.tracker
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Start or resume the meeting and (re)arm the tick task.
    pub async fn start(&mut self) -> Result<TrackerSnapshot, TrackerError> {
        self.tracker.start()?;

        if self.ticker.is_none() {
            self.next_generation += 1;
            self.ticker = Some(Ticker::spawn(
                self.tick_interval,
                self.next_generation,
                self.tick_tx.clone(),
            ));
        }

        Ok(self.publish().await)
    }

    pub async fn pause(&mut self) -> TrackerSnapshot {
        self.cancel_ticker();
        self.tracker.pause();
        self.publish().await
    }

    /// Stop the meeting, then persist it and run the hook.
    ///
    /// Persistence and hook failures are logged; they never affect the
    /// tracker.
    pub async fn stop(&mut self) -> MeetingStopResult {
        self.cancel_ticker();
        let summary = self.tracker.stop();
        self.publish().await;

        if !summary.has_duration() {
            debug!("Stop with no tracked time, nothing to record");
            return MeetingStopResult {
                summary,
                meeting_id: None,
            };
        }

        let meeting_id = self.persist(&summary).await;
        self.status.record_stop(summary.clone(), meeting_id).await;
        self.spawn_hook(&summary, meeting_id);

        MeetingStopResult {
            summary,
            meeting_id,
        }
    }

    pub async fn update_config(
        &mut self,
        update: ConfigUpdate,
    ) -> Result<TrackerSnapshot, TrackerError> {
        self.tracker.update_config(update)?;
        Ok(self.publish().await)
    }

    /// Cost of the current run if `update` were applied, without applying it.
    pub fn preview(&self, update: ConfigUpdate) -> Result<CostPreview, TrackerError> {
        let candidate = self.tracker.config().with_update(update)?;
        let run = self.tracker.run();
        Ok(CostPreview {
            total_cost: self.tracker.preview_cost(&candidate),
            current_total_cost: run.total_cost,
            elapsed_seconds: run.elapsed_seconds,
        })
    }

    pub async fn load_config(&mut self, config: MeetingConfig) -> TrackerSnapshot {
        info!("Loading meeting config '{}'", config.title);
        self.tracker.replace_config(config);
        self.publish().await
    }

    /// Apply a tick. Ticks from a ticker that has since been cancelled are
    /// dropped.
    pub async fn on_tick(&mut self, event: TickEvent) {
        let live = self
            .ticker
            .as_ref()
            .is_some_and(|ticker| ticker.generation() == event.generation);
        if !live {
            debug!("Dropping stale tick from generation {}", event.generation);
            return;
        }

        if self.tracker.tick().is_some() {
            self.publish().await;
        }
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.tracker.snapshot()
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    async fn publish(&self) -> TrackerSnapshot {
        let snapshot = self.tracker.snapshot();
        self.status.publish(snapshot.clone()).await;
        snapshot
    }

    async fn persist(&self, summary: &MeetingSummary) -> Option<i64> {
        let sink = self.sink.as_ref()?;
        match sink.record(summary).await {
            Ok(id) => {
                info!("Meeting '{}' saved as #{}", summary.title, id);
                Some(id)
            }
            Err(e) => {
                warn!("Failed to save meeting '{}': {}", summary.title, e);
                None
            }
        }
    }

    fn spawn_hook(&self, summary: &MeetingSummary, meeting_id: Option<i64>) {
        let Some(hook) = self.hook.clone() else {
            return;
        };

        let result = MeetingResult {
            meeting_id,
            summary: summary.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = hook.execute(&result).await {
                // Hook failure does NOT affect the stored meeting
                warn!("Post-meeting hook failed: {}", e);
            }
        });
    }
}
