//! Shared tracker status for API readers.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::tracker::{MeetingSummary, TrackerSnapshot};

/// Latest published tracker state.
#[derive(Debug, Clone, Default)]
pub struct TrackerStatus {
    pub snapshot: TrackerSnapshot,
    pub last_summary: Option<MeetingSummary>,
    pub last_meeting_id: Option<i64>,
}

/// Thread-safe handle for sharing tracker state between the service loop and
/// API handlers. Only the service loop writes.
#[derive(Clone, Default)]
pub struct TrackerStatusHandle {
    inner: Arc<Mutex<TrackerStatus>>,
}

impl TrackerStatusHandle {
    pub async fn get(&self) -> TrackerStatus {
        self.inner.lock().await.clone()
    }

    pub async fn snapshot(&self) -> TrackerSnapshot {
        self.inner.lock().await.snapshot.clone()
    }

    pub async fn publish(&self, snapshot: TrackerSnapshot) {
        let mut status = self.inner.lock().await;
        status.snapshot = snapshot;
    }

    pub async fn record_stop(&self, summary: MeetingSummary, meeting_id: Option<i64>) {
        let mut status = self.inner.lock().await;
        status.last_summary = Some(summary);
        status.last_meeting_id = meeting_id;
    }
}
