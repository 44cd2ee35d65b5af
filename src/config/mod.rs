use crate::cost::{CostMethod, RateTable};
use crate::global;
use crate::meeting::config::MeetingConfig;
use crate::meeting::tracker::DEFAULT_HISTORY_CAPACITY;
use crate::subscription::SubscriptionInfo;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_PORT: u16 = 3790;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub tracker: TrackerConfig,
    pub rates: RateTable,
    pub subscription: SubscriptionInfo,
    pub meeting: MeetingHookConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl ServerConfig {
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Cadence of cost recomputation while a meeting is running.
    pub tick_interval_ms: u64,
    /// Number of cost samples kept for the trend view.
    pub history_capacity: usize,
    pub default_participants: u32,
    pub default_cost_method: CostMethod,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            default_participants: 1,
            default_cost_method: CostMethod::FixedRate,
        }
    }
}

impl TrackerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Config a fresh tracker starts with.
    pub fn initial_meeting(&self) -> MeetingConfig {
        MeetingConfig::new(self.default_participants, self.default_cost_method)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingHookConfig {
    /// Shell command to run after a meeting stops.
    /// Receives the meeting summary as JSON via stdin.
    /// Env vars: MEETCOST_MEETING_ID, MEETCOST_TITLE, MEETCOST_TOTAL_COST,
    /// MEETCOST_DURATION_SECONDS, MEETCOST_EFFICIENCY
    pub post_command: String,
    /// Timeout in seconds for the post_command (default: 3600 = 1 hour)
    pub post_command_timeout_seconds: u64,
}

impl Default for MeetingHookConfig {
    fn default() -> Self {
        Self {
            post_command: String::new(),
            post_command_timeout_seconds: 3600,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config = Self::parse(&content)?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::Tier;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 3790);
        assert_eq!(config.tracker.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.tracker.history_capacity, 60);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [server]
            port = 4000

            [tracker]
            default_participants = 6
            default_cost_method = "role-based"

            [rates]
            salary_based = 95.0

            [subscription]
            tier = "premium"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.base_url(), "http://127.0.0.1:4000");
        assert_eq!(config.tracker.tick_interval_ms, 1000);
        let initial = config.tracker.initial_meeting();
        assert_eq!(initial.participants, 6);
        assert_eq!(initial.cost_method, CostMethod::RoleBased);
        assert_eq!(config.rates.salary_based, 95.0);
        assert_eq!(config.rates.fixed_rate, 50.0);
        assert_eq!(config.subscription.tier, Tier::Premium);
        assert!(config.meeting.post_command.is_empty());
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let content = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(Config::parse(&content).unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(Config::parse("[server]\nport = \"not a port\"").is_err());
    }

    #[test]
    fn test_zero_participants_default_clamped() {
        let config = Config::parse("[tracker]\ndefault_participants = 0").unwrap();
        assert_eq!(config.tracker.initial_meeting().participants, 1);
    }
}
