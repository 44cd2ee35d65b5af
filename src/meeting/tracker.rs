//! Meeting cost tracker state machine.
//!
//! Idle → Running ⇄ Paused → Stopped, where Stopped behaves like Idle on the
//! next start. Cost is always derived from elapsed time and the current
//! config; it is never set on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::clock::Clock;
use super::config::{ConfigUpdate, MeetingConfig};
use super::error::TrackerError;
use crate::cost::{calculate_cost, CostMethod, EfficiencyRating, RateTable};

pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

/// Phase of the tracker, derived from the run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerPhase {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl TrackerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

/// Mutable state of one timer lifecycle.
#[derive(Debug, Clone, Default)]
pub struct MeetingRun {
    pub run_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_seconds: f64,
    pub total_cost: f64,
    pub running: bool,
    pub cost_history: VecDeque<f64>,
}

/// Read-only view of the tracker for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub state: TrackerPhase,
    pub config: MeetingConfig,
    pub elapsed_seconds: f64,
    pub total_cost: f64,
    pub running: bool,
    pub cost_history: Vec<f64>,
    pub hourly_rate: f64,
    pub efficiency: Option<EfficiencyRating>,
}

impl Default for TrackerSnapshot {
    fn default() -> Self {
        Self {
            state: TrackerPhase::Idle,
            config: MeetingConfig::default(),
            elapsed_seconds: 0.0,
            total_cost: 0.0,
            running: false,
            cost_history: Vec::new(),
            hourly_rate: 0.0,
            efficiency: None,
        }
    }
}

/// Final figures emitted when a run stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub run_id: Option<Uuid>,
    pub title: String,
    pub meeting_type: String,
    pub participants: u32,
    pub cost_method: CostMethod,
    pub hourly_rate: f64,
    pub elapsed_seconds: f64,
    pub total_cost: f64,
    pub efficiency: Option<EfficiencyRating>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: DateTime<Utc>,
}

impl MeetingSummary {
    /// Whether anything was actually tracked.
    pub fn has_duration(&self) -> bool {
        self.elapsed_seconds > 0.0
    }
}

pub struct MeetingTracker {
    config: MeetingConfig,
    run: MeetingRun,
    /// Wall-clock instant the current run is measured from. `None` means the
    /// next start is fresh.
    reference: Option<DateTime<Utc>>,
    rates: RateTable,
    history_capacity: usize,
    clock: Arc<dyn Clock>,
}

impl MeetingTracker {
    pub fn new(config: MeetingConfig, rates: RateTable, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            run: MeetingRun::default(),
            reference: None,
            rates,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            clock,
        }
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    pub fn config(&self) -> &MeetingConfig {
        &self.config
    }

    pub fn run(&self) -> &MeetingRun {
        &self.run
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn phase(&self) -> TrackerPhase {
        if self.run.running {
            TrackerPhase::Running
        } else if self.reference.is_some() {
            TrackerPhase::Paused
        } else if self.run.elapsed_seconds > 0.0 {
            TrackerPhase::Stopped
        } else {
            TrackerPhase::Idle
        }
    }

    /// Start a fresh run, or resume a paused one.
    pub fn start(&mut self) -> Result<TrackerPhase, TrackerError> {
        if self.run.running {
            debug!("Tracker already running, ignoring start");
            return Ok(TrackerPhase::Running);
        }

        if self.config.cost_method == CostMethod::Custom && self.config.custom_rate.is_none() {
            return Err(TrackerError::MissingCustomRate);
        }

        let now = self.clock.now();
        match self.reference {
            None => {
                self.run = MeetingRun {
                    run_id: Some(Uuid::new_v4()),
                    started_at: Some(now),
                    ..MeetingRun::default()
                };
                info!(
                    "Meeting '{}' started ({} participants, {})",
                    self.config.title, self.config.participants, self.config.cost_method
                );
            }
            Some(_) => {
                info!(
                    "Meeting '{}' resumed at {:.1}s",
                    self.config.title, self.run.elapsed_seconds
                );
            }
        }

        self.reference = Some(now - seconds_to_duration(self.run.elapsed_seconds));
        self.run.running = true;
        Ok(TrackerPhase::Running)
    }

    /// Pause a running meeting. Elapsed time and cost are brought up to date
    /// so that a later resume continues exactly where this left off.
    pub fn pause(&mut self) -> TrackerPhase {
        if !self.run.running {
            return self.phase();
        }

        self.sync_elapsed();
        self.run.running = false;
        info!(
            "Meeting '{}' paused at {:.1}s ({:.2})",
            self.config.title, self.run.elapsed_seconds, self.run.total_cost
        );
        TrackerPhase::Paused
    }

    /// Finalize the current run. A stop with no run is a no-op that still
    /// reports (zeroed) figures.
    pub fn stop(&mut self) -> MeetingSummary {
        if self.run.running {
            self.sync_elapsed();
        } else {
            self.recompute_cost();
        }
        self.run.running = false;
        self.reference = None;

        let summary = self.summary();
        if summary.has_duration() {
            info!(
                "Meeting '{}' stopped after {:.1}s, total cost {:.2}",
                summary.title, summary.elapsed_seconds, summary.total_cost
            );
        }
        summary
    }

    /// Periodic update. Returns the new cost sample, or `None` when not running.
    pub fn tick(&mut self) -> Option<f64> {
        if !self.run.running {
            return None;
        }

        self.sync_elapsed();
        let cost = self.run.total_cost;
        self.run.cost_history.push_back(cost);
        while self.run.cost_history.len() > self.history_capacity {
            self.run.cost_history.pop_front();
        }
        Some(cost)
    }

    /// Edit one config field. When time has already been tracked, the cost is
    /// recomputed immediately from the current elapsed time; recorded history
    /// samples are left as they were.
    pub fn update_config(&mut self, update: ConfigUpdate) -> Result<&MeetingConfig, TrackerError> {
        let field = update.field_name();
        self.config.apply(update)?;
        debug!("Meeting config field '{}' updated", field);

        if self.run.elapsed_seconds > 0.0 {
            self.recompute_cost();
        }
        Ok(&self.config)
    }

    /// Replace the whole config, e.g. from a calendar import. Same cost rules as
    /// [`update_config`](Self::update_config).
    pub fn replace_config(&mut self, config: MeetingConfig) {
        self.config = config;
        if self.run.elapsed_seconds > 0.0 {
            self.recompute_cost();
        }
    }

    /// Cost at the current elapsed time under a hypothetical config.
    pub fn preview_cost(&self, config: &MeetingConfig) -> f64 {
        calculate_cost(self.run.elapsed_seconds, config, &self.rates)
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            state: self.phase(),
            config: self.config.clone(),
            elapsed_seconds: self.run.elapsed_seconds,
            total_cost: self.run.total_cost,
            running: self.run.running,
            cost_history: self.run.cost_history.iter().copied().collect(),
            hourly_rate: self.hourly_rate(),
            efficiency: EfficiencyRating::classify(self.run.total_cost, self.run.elapsed_seconds),
        }
    }

    fn summary(&self) -> MeetingSummary {
        MeetingSummary {
            run_id: self.run.run_id,
            title: self.config.title.clone(),
            meeting_type: self.config.meeting_type.as_str().to_string(),
            participants: self.config.participants,
            cost_method: self.config.cost_method,
            hourly_rate: self.hourly_rate(),
            elapsed_seconds: self.run.elapsed_seconds,
            total_cost: self.run.total_cost,
            efficiency: EfficiencyRating::classify(self.run.total_cost, self.run.elapsed_seconds),
            started_at: self.run.started_at,
            ended_at: self.clock.now(),
        }
    }

    fn hourly_rate(&self) -> f64 {
        self.rates
            .hourly_rate(self.config.cost_method, self.config.custom_rate)
    }

    fn sync_elapsed(&mut self) {
        if let Some(reference) = self.reference {
            let elapsed = (self.clock.now() - reference).num_milliseconds() as f64 / 1000.0;
            // Never step backwards, even if the wall clock does.
            self.run.elapsed_seconds = elapsed.max(self.run.elapsed_seconds);
        }
        self.recompute_cost();
    }

    fn recompute_cost(&mut self) {
        self.run.total_cost = calculate_cost(self.run.elapsed_seconds, &self.config, &self.rates);
    }
}

fn seconds_to_duration(seconds: f64) -> chrono::Duration {
    chrono::Duration::milliseconds((seconds * 1000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::clock::ManualClock;

    fn tracker(config: MeetingConfig) -> (MeetingTracker, ManualClock) {
        let clock = ManualClock::default();
        let tracker = MeetingTracker::new(config, RateTable::default(), Arc::new(clock.clone()));
        (tracker, clock)
    }

    #[test]
    fn test_start_while_running_ignores_pending_custom_rate() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(3, CostMethod::FixedRate));
        tracker.start().unwrap();
        clock.advance_secs(60);
        tracker
            .update_config(ConfigUpdate::CostMethod(CostMethod::Custom))
            .unwrap();

        assert_eq!(tracker.start(), Ok(TrackerPhase::Running));
        assert!(tracker.run().running);

        // Once stopped, the missing rate blocks a fresh run
        tracker.stop();
        assert_eq!(tracker.start(), Err(TrackerError::MissingCustomRate));
    }

    fn run_ticks(tracker: &mut MeetingTracker, clock: &ManualClock, seconds: i64) {
        for _ in 0..seconds {
            clock.advance_secs(1);
            tracker.tick();
        }
    }

    #[test]
    fn test_initial_state() {
        let (tracker, _) = tracker(MeetingConfig::default());
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.state, TrackerPhase::Idle);
        assert_eq!(snapshot.elapsed_seconds, 0.0);
        assert_eq!(snapshot.total_cost, 0.0);
        assert!(!snapshot.running);
        assert!(snapshot.cost_history.is_empty());
    }

    #[test]
    fn test_fixed_rate_hour() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(5, CostMethod::FixedRate));
        tracker.start().unwrap();
        clock.advance_secs(3600);
        let summary = tracker.stop();

        assert!((summary.elapsed_seconds - 3600.0).abs() < 1e-9);
        assert!((summary.total_cost - 250.0).abs() < 1e-9);
        assert_eq!(tracker.phase(), TrackerPhase::Stopped);
    }

    #[test]
    fn test_role_based_hour() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(1, CostMethod::RoleBased));
        tracker.start().unwrap();
        clock.advance_secs(3600);
        let summary = tracker.stop();
        assert!((summary.total_cost - tracker.rates().role_based_rate()).abs() < 1e-9);
    }

    #[test]
    fn test_stop_without_start() {
        let (mut tracker, _) = tracker(MeetingConfig::default());
        let summary = tracker.stop();
        assert_eq!(summary.elapsed_seconds, 0.0);
        assert_eq!(summary.total_cost, 0.0);
        assert!(summary.efficiency.is_none());
        assert!(!tracker.run().running);
        assert_eq!(tracker.phase(), TrackerPhase::Idle);
    }

    #[test]
    fn test_custom_without_rate_rejected() {
        let (mut tracker, _) = tracker(MeetingConfig::new(3, CostMethod::Custom));
        assert_eq!(tracker.start().unwrap_err(), TrackerError::MissingCustomRate);
        assert!(!tracker.run().running);
        assert_eq!(tracker.phase(), TrackerPhase::Idle);

        tracker.update_config(ConfigUpdate::CustomRate(60.0)).unwrap();
        assert_eq!(tracker.start().unwrap(), TrackerPhase::Running);
    }

    #[test]
    fn test_pause_resume_does_not_count_pause() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(2, CostMethod::FixedRate));
        tracker.start().unwrap();
        run_ticks(&mut tracker, &clock, 30);
        assert_eq!(tracker.pause(), TrackerPhase::Paused);

        // Long break: none of this should be billed
        clock.advance_secs(900);
        tracker.tick();
        assert_eq!(tracker.run().elapsed_seconds, 30.0);

        tracker.start().unwrap();
        run_ticks(&mut tracker, &clock, 45);
        let summary = tracker.stop();

        assert!((summary.elapsed_seconds - 75.0).abs() < 1e-6);
        let expected = 50.0 * (75.0 / 3600.0) * 2.0;
        assert!((summary.total_cost - expected).abs() < 1e-6);
    }

    #[test]
    fn test_pause_captures_time_since_last_tick() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(1, CostMethod::FixedRate));
        tracker.start().unwrap();
        run_ticks(&mut tracker, &clock, 10);
        clock.advance(chrono::Duration::milliseconds(500));
        tracker.pause();
        assert!((tracker.run().elapsed_seconds - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_pause_preserves_history() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(1, CostMethod::FixedRate));
        tracker.start().unwrap();
        run_ticks(&mut tracker, &clock, 5);
        tracker.pause();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.cost_history.len(), 5);
        assert_eq!(snapshot.state, TrackerPhase::Paused);
    }

    #[test]
    fn test_stop_while_paused_ignores_pause_time() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(1, CostMethod::FixedRate));
        tracker.start().unwrap();
        clock.advance_secs(60);
        tracker.pause();
        clock.advance_secs(600);
        let summary = tracker.stop();
        assert!((summary.elapsed_seconds - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_start_after_stop_is_fresh() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(3, CostMethod::SalaryBased));
        tracker.start().unwrap();
        run_ticks(&mut tracker, &clock, 20);
        let first = tracker.stop();

        tracker.start().unwrap();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.elapsed_seconds, 0.0);
        assert_eq!(snapshot.total_cost, 0.0);
        assert!(snapshot.cost_history.is_empty());
        assert_eq!(snapshot.config.participants, 3);
        assert_ne!(tracker.run().run_id, first.run_id);
    }

    #[test]
    fn test_history_is_bounded() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(4, CostMethod::FixedRate));
        tracker.start().unwrap();
        run_ticks(&mut tracker, &clock, 75);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.cost_history.len(), 60);
        assert_eq!(snapshot.cost_history.last().copied(), Some(snapshot.total_cost));
        // Oldest samples evicted: first retained sample is from tick 16
        let expected_first = 50.0 * (16.0 / 3600.0) * 4.0;
        assert!((snapshot.cost_history[0] - expected_first).abs() < 1e-9);
    }

    #[test]
    fn test_custom_history_capacity() {
        let (tracker, clock) = tracker(MeetingConfig::default());
        let mut tracker = tracker.with_history_capacity(10);
        tracker.start().unwrap();
        run_ticks(&mut tracker, &clock, 25);
        assert_eq!(tracker.snapshot().cost_history.len(), 10);
    }

    #[test]
    fn test_participant_change_recomputes_immediately() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(4, CostMethod::FixedRate));
        tracker.start().unwrap();
        run_ticks(&mut tracker, &clock, 600);
        let before = tracker.snapshot();
        assert!((before.total_cost - 50.0 * (600.0 / 3600.0) * 4.0).abs() < 1e-9);

        tracker.update_config(ConfigUpdate::Participants(8)).unwrap();
        let after = tracker.snapshot();
        assert!((after.total_cost - before.total_cost * 2.0).abs() < 1e-9);
        assert_eq!(after.elapsed_seconds, before.elapsed_seconds);
        // History is not rewritten
        assert_eq!(after.cost_history, before.cost_history);
    }

    #[test]
    fn test_method_change_while_paused_recomputes() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(1, CostMethod::FixedRate));
        tracker.start().unwrap();
        clock.advance_secs(3600);
        tracker.pause();

        tracker
            .update_config(ConfigUpdate::CostMethod(CostMethod::SalaryBased))
            .unwrap();
        assert!((tracker.snapshot().total_cost - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_config_change_before_start_keeps_zero_cost() {
        let (mut tracker, _) = tracker(MeetingConfig::default());
        tracker.update_config(ConfigUpdate::Participants(10)).unwrap();
        assert_eq!(tracker.snapshot().total_cost, 0.0);
    }

    #[test]
    fn test_invalid_update_leaves_state() {
        let (mut tracker, _) = tracker(MeetingConfig::new(2, CostMethod::FixedRate));
        assert!(tracker.update_config(ConfigUpdate::CustomRate(10.0)).is_err());
        assert_eq!(tracker.config().cost_method, CostMethod::FixedRate);
        assert!(tracker.config().custom_rate.is_none());
    }

    #[test]
    fn test_preview_cost_does_not_commit() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(2, CostMethod::FixedRate));
        tracker.start().unwrap();
        clock.advance_secs(1800);
        tracker.tick();

        let pending = tracker
            .config()
            .with_update(ConfigUpdate::Participants(6))
            .unwrap();
        let preview = tracker.preview_cost(&pending);
        assert!((preview - 150.0).abs() < 1e-9);
        assert!((tracker.snapshot().total_cost - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(3, CostMethod::RoleBased));
        tracker.start().unwrap();
        run_ticks(&mut tracker, &clock, 5);
        clock.advance_secs(3);
        assert_eq!(tracker.snapshot(), tracker.snapshot());
    }

    #[test]
    fn test_tick_when_idle_is_noop() {
        let (mut tracker, clock) = tracker(MeetingConfig::default());
        clock.advance_secs(10);
        assert!(tracker.tick().is_none());
        assert!(tracker.snapshot().cost_history.is_empty());
    }

    #[test]
    fn test_cost_never_negative() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(3, CostMethod::Other));
        tracker.start().unwrap();
        clock.advance_secs(-30);
        tracker.tick();
        let snapshot = tracker.snapshot();
        assert!(snapshot.total_cost >= 0.0);
        assert!(snapshot.elapsed_seconds >= 0.0);
    }

    #[test]
    fn test_double_start_keeps_reference() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(1, CostMethod::FixedRate));
        tracker.start().unwrap();
        clock.advance_secs(120);
        tracker.start().unwrap();
        clock.advance_secs(60);
        let summary = tracker.stop();
        assert!((summary.elapsed_seconds - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_efficiency() {
        let (mut tracker, clock) = tracker(MeetingConfig::new(5, CostMethod::FixedRate));
        tracker.start().unwrap();
        clock.advance_secs(3600);
        let summary = tracker.stop();
        // 250 over 60 minutes is ~4.17 per minute
        assert_eq!(summary.efficiency, Some(EfficiencyRating::Excellent));
        assert_eq!(summary.meeting_type, "other");
        assert!(summary.started_at.is_some());
    }

    #[test]
    fn test_tracker_phase_serialization() {
        let json = serde_json::to_string(&TrackerPhase::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
    }
}
