//! Meeting record persistence.
//!
//! CRUD operations for the `meetings` table. Raw SQL with rusqlite, no ORM.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::meeting::tracker::MeetingSummary;

/// A finished meeting as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub id: i64,
    pub run_id: Option<String>,
    pub title: String,
    pub meeting_type: String,
    pub participants: i64,
    pub cost_method: String,
    pub hourly_rate: f64,
    pub duration_seconds: f64,
    pub total_cost: f64,
    pub efficiency: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: String,
    pub created_at: String,
}

/// Aggregate figures over all stored meetings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingStats {
    pub meeting_count: i64,
    pub total_cost: f64,
    pub total_duration_seconds: f64,
    pub average_cost: f64,
    pub average_duration_seconds: f64,
    /// `None` until some time has been tracked.
    pub cost_per_minute: Option<f64>,
}

const RECORD_COLUMNS: &str = "id, run_id, title, meeting_type, participants, cost_method, \
     hourly_rate, duration_seconds, total_cost, efficiency, started_at, ended_at, created_at";

/// Repository for meeting records.
pub struct MeetingRepository;

impl MeetingRepository {
    /// Insert a finished meeting. Returns the new meeting ID.
    pub fn insert(conn: &Connection, summary: &MeetingSummary) -> Result<i64> {
        conn.execute(
            "INSERT INTO meetings (run_id, title, meeting_type, participants, cost_method, \
             hourly_rate, duration_seconds, total_cost, efficiency, started_at, ended_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                summary.run_id.map(|id| id.to_string()),
                summary.title,
                summary.meeting_type,
                summary.participants as i64,
                summary.cost_method.as_str(),
                summary.hourly_rate,
                summary.elapsed_seconds,
                summary.total_cost,
                summary.efficiency.map(|rating| rating.as_str()),
                summary.started_at.map(|t| t.to_rfc3339()),
                summary.ended_at.to_rfc3339(),
            ],
        )
        .context("Failed to insert meeting")?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a meeting by ID.
    pub fn get(conn: &Connection, id: i64) -> Result<Option<MeetingRecord>> {
        let mut stmt = conn
            .prepare(&format!("SELECT {RECORD_COLUMNS} FROM meetings WHERE id = ?1"))
            .context("Failed to prepare meeting query")?;

        let mut rows = stmt
            .query_map(params![id], record_from_row)
            .context("Failed to query meeting")?;

        match rows.next() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    /// List meetings, newest first.
    pub fn list(conn: &Connection, limit: usize) -> Result<Vec<MeetingRecord>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM meetings ORDER BY ended_at DESC, id DESC LIMIT ?1"
            ))
            .context("Failed to prepare meetings list query")?;

        let meetings = stmt
            .query_map(params![limit as i64], record_from_row)
            .context("Failed to list meetings")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to map meetings")?;

        Ok(meetings)
    }

    pub fn stats(conn: &Connection) -> Result<MeetingStats> {
        let (meeting_count, total_cost, total_duration_seconds): (i64, f64, f64) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(total_cost), 0.0), \
                 COALESCE(SUM(duration_seconds), 0.0) FROM meetings",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .context("Failed to compute meeting stats")?;

        let (average_cost, average_duration_seconds) = if meeting_count > 0 {
            (
                total_cost / meeting_count as f64,
                total_duration_seconds / meeting_count as f64,
            )
        } else {
            (0.0, 0.0)
        };

        let cost_per_minute =
            (total_duration_seconds > 0.0).then(|| total_cost / (total_duration_seconds / 60.0));

        Ok(MeetingStats {
            meeting_count,
            total_cost,
            total_duration_seconds,
            average_cost,
            average_duration_seconds,
            cost_per_minute,
        })
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<MeetingRecord> {
    Ok(MeetingRecord {
        id: row.get(0)?,
        run_id: row.get(1)?,
        title: row.get(2)?,
        meeting_type: row.get(3)?,
        participants: row.get(4)?,
        cost_method: row.get(5)?,
        hourly_rate: row.get(6)?,
        duration_seconds: row.get(7)?,
        total_cost: row.get(8)?,
        efficiency: row.get(9)?,
        started_at: row.get(10)?,
        ended_at: row.get(11)?,
        created_at: row.get(12)?,
    })
}
