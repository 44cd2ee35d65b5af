//! Where finished meetings are recorded.

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::tracker::MeetingSummary;
use crate::db::{Database, MeetingRepository};

/// Destination for finished meeting summaries. Returns the stored record ID.
#[async_trait]
pub trait MeetingSink: Send + Sync {
    async fn record(&self, summary: &MeetingSummary) -> Result<i64>;
}

/// Stores meetings in the local SQLite database.
pub struct SqliteMeetingSink {
    db: Database,
}

impl SqliteMeetingSink {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MeetingSink for SqliteMeetingSink {
    async fn record(&self, summary: &MeetingSummary) -> Result<i64> {
        let db = self.db.clone();
        let summary = summary.clone();
        tokio::task::spawn_blocking(move || {
            let conn = db.connect()?;
            MeetingRepository::insert(&conn, &summary)
        })
        .await
        .context("Meeting persistence task panicked")?
    }
}
