use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Location of the meetings database. Each `connect` opens a fresh
/// connection and makes sure the schema exists.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Database in the user's data directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(crate::global::db_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connect(&self) -> Result<Connection> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(&self.path).context("Failed to open database connection")?;

        migrate(&conn)?;

        Ok(conn)
    }
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS meetings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id TEXT,
            title TEXT NOT NULL,
            meeting_type TEXT NOT NULL,
            participants INTEGER NOT NULL,
            cost_method TEXT NOT NULL,
            hourly_rate REAL NOT NULL,
            duration_seconds REAL NOT NULL,
            total_cost REAL NOT NULL,
            efficiency TEXT,
            started_at TIMESTAMP,
            ended_at TIMESTAMP NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create meetings table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_meetings_ended_at ON meetings(ended_at DESC)",
        [],
    )
    .context("Failed to create meetings ended_at index")?;

    Ok(())
}
