//! Calendar event import.
//!
//! Calendar provider adapters (Google, Microsoft) live outside this crate and
//! deliver events as JSON. This module maps one such event to an initial
//! meeting config plus a cost estimate for its scheduled duration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TrackerConfig;
use crate::cost::{calculate_cost, EfficiencyRating, RateTable};
use crate::meeting::config::{MeetingConfig, MeetingType, DEFAULT_TITLE};
use crate::meeting::TrackerError;

/// An event as delivered by a calendar provider adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub title: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub attendees: Vec<String>,
    /// Provider the event came from, e.g. "google" or "microsoft".
    #[serde(default)]
    pub provider: Option<String>,
}

impl CalendarEvent {
    pub fn duration_seconds(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64
    }
}

/// Result of importing an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedMeeting {
    pub config: MeetingConfig,
    pub duration_seconds: f64,
    pub estimated_cost: f64,
    pub efficiency: Option<EfficiencyRating>,
    pub provider: Option<String>,
}

pub fn import_event(
    event: &CalendarEvent,
    defaults: &TrackerConfig,
    rates: &RateTable,
) -> Result<ImportedMeeting, TrackerError> {
    if event.end < event.start {
        return Err(TrackerError::invalid_value(
            "end",
            "calendar event ends before it starts",
        ));
    }

    let mut config = defaults.initial_meeting();
    config.title = event
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();
    config.meeting_type = MeetingType::CalendarImport;
    config.participants = unique_attendees(&event.attendees).max(1);

    let duration_seconds = event.duration_seconds();
    let estimated_cost = calculate_cost(duration_seconds, &config, rates);

    Ok(ImportedMeeting {
        efficiency: EfficiencyRating::classify(estimated_cost, duration_seconds),
        config,
        duration_seconds,
        estimated_cost,
        provider: event.provider.clone(),
    })
}

fn unique_attendees(attendees: &[String]) -> u32 {
    let mut seen: Vec<String> = attendees
        .iter()
        .map(|a| a.trim().to_ascii_lowercase())
        .filter(|a| !a.is_empty())
        .collect();
    seen.sort();
    seen.dedup();
    seen.len() as u32
}
