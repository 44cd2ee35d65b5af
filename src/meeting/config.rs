//! Meeting configuration and field-level edits.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::TrackerError;
use crate::cost::CostMethod;

pub const DEFAULT_TITLE: &str = "Untitled Meeting";
pub const MIN_PARTICIPANTS: u32 = 1;
pub const MIN_CUSTOM_RATE: f64 = 1.0;

/// Meeting category. Informational only, never affects cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingType {
    Brainstorming,
    StatusUpdate,
    DecisionMaking,
    Training,
    ClientMeeting,
    TeamBuilding,
    #[default]
    Other,
    CalendarImport,
}

impl MeetingType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brainstorming" => Some(Self::Brainstorming),
            "status-update" => Some(Self::StatusUpdate),
            "decision-making" => Some(Self::DecisionMaking),
            "training" => Some(Self::Training),
            "client-meeting" => Some(Self::ClientMeeting),
            "team-building" => Some(Self::TeamBuilding),
            "other" => Some(Self::Other),
            "calendar-import" => Some(Self::CalendarImport),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brainstorming => "brainstorming",
            Self::StatusUpdate => "status-update",
            Self::DecisionMaking => "decision-making",
            Self::Training => "training",
            Self::ClientMeeting => "client-meeting",
            Self::TeamBuilding => "team-building",
            Self::Other => "other",
            Self::CalendarImport => "calendar-import",
        }
    }
}

/// Configuration of the meeting being tracked. Survives stop/start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingConfig {
    pub title: String,
    pub meeting_type: MeetingType,
    pub participants: u32,
    pub cost_method: CostMethod,
    /// Only present while `cost_method` is [`CostMethod::Custom`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_rate: Option<f64>,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            meeting_type: MeetingType::Other,
            participants: MIN_PARTICIPANTS,
            cost_method: CostMethod::FixedRate,
            custom_rate: None,
        }
    }
}

impl MeetingConfig {
    pub fn new(participants: u32, cost_method: CostMethod) -> Self {
        Self {
            participants: participants.max(MIN_PARTICIPANTS),
            cost_method,
            ..Self::default()
        }
    }

    /// Apply a single field edit, clamping out-of-range numbers.
    pub fn apply(&mut self, update: ConfigUpdate) -> Result<(), TrackerError> {
        match update {
            ConfigUpdate::Title(title) => {
                let title = title.trim();
                self.title = if title.is_empty() {
                    DEFAULT_TITLE.to_string()
                } else {
                    title.to_string()
                };
            }
            ConfigUpdate::MeetingType(meeting_type) => self.meeting_type = meeting_type,
            ConfigUpdate::Participants(count) => self.participants = clamp_participants(count),
            ConfigUpdate::CostMethod(method) => {
                if method != CostMethod::Custom {
                    self.custom_rate = None;
                }
                self.cost_method = method;
            }
            ConfigUpdate::CustomRate(rate) => {
                if self.cost_method != CostMethod::Custom {
                    return Err(TrackerError::invalid_value(
                        "custom_rate",
                        "only applies when the cost method is custom",
                    ));
                }
                if !rate.is_finite() {
                    return Err(TrackerError::invalid_value("custom_rate", "must be a finite number"));
                }
                self.custom_rate = Some(rate.max(MIN_CUSTOM_RATE));
            }
        }
        Ok(())
    }

    /// Copy of this config with `update` applied, leaving `self` untouched.
    pub fn with_update(&self, update: ConfigUpdate) -> Result<Self, TrackerError> {
        let mut next = self.clone();
        next.apply(update)?;
        Ok(next)
    }
}

fn clamp_participants(count: i64) -> u32 {
    count.clamp(MIN_PARTICIPANTS as i64, u32::MAX as i64) as u32
}

/// A single config field edit, as sent by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigUpdate {
    Title(String),
    MeetingType(MeetingType),
    Participants(i64),
    CostMethod(CostMethod),
    CustomRate(f64),
}

impl ConfigUpdate {
    /// Build an update from a `(field, value)` pair.
    ///
    /// Field names are accepted in snake_case or camelCase.
    pub fn from_field(field: &str, value: &Value) -> Result<Self, TrackerError> {
        match field {
            "title" => Ok(Self::Title(value_as_string(field, value)?)),
            "type" | "meeting_type" | "meetingType" => {
                let raw = value_as_string(field, value)?;
                MeetingType::parse(&raw)
                    .map(Self::MeetingType)
                    .ok_or_else(|| TrackerError::invalid_value(field, format!("unknown meeting type '{raw}'")))
            }
            "participants" => {
                let count = value
                    .as_i64()
                    .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
                    .or_else(|| value.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
                    .ok_or_else(|| TrackerError::invalid_value(field, "expected an integer"))?;
                Ok(Self::Participants(count))
            }
            "cost_method" | "costMethod" => {
                Ok(Self::CostMethod(CostMethod::parse(&value_as_string(field, value)?)))
            }
            "custom_rate" | "customRate" => {
                let rate = value
                    .as_f64()
                    .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
                    .ok_or_else(|| TrackerError::invalid_value(field, "expected a number"))?;
                Ok(Self::CustomRate(rate))
            }
            other => Err(TrackerError::InvalidField(other.to_string())),
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::MeetingType(_) => "meeting_type",
            Self::Participants(_) => "participants",
            Self::CostMethod(_) => "cost_method",
            Self::CustomRate(_) => "custom_rate",
        }
    }
}

/// Text form of a scalar. Numbers and bools are accepted so `2024` is a valid title.
fn value_as_string(field: &str, value: &Value) -> Result<String, TrackerError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(TrackerError::invalid_value(field, "expected a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = MeetingConfig::default();
        assert_eq!(config.title, "Untitled Meeting");
        assert_eq!(config.participants, 1);
        assert_eq!(config.meeting_type, MeetingType::Other);
        assert!(config.custom_rate.is_none());
    }

    #[test]
    fn test_scalar_title_is_accepted_as_text() {
        assert_eq!(
            ConfigUpdate::from_field("title", &json!(2024)).unwrap(),
            ConfigUpdate::Title("2024".to_string())
        );
        assert_eq!(
            ConfigUpdate::from_field("title", &json!(true)).unwrap(),
            ConfigUpdate::Title("true".to_string())
        );
        assert!(ConfigUpdate::from_field("title", &json!(["a"])).is_err());
        assert!(ConfigUpdate::from_field("title", &Value::Null).is_err());
    }

    #[test]
    fn test_participants_clamped() {
        let mut config = MeetingConfig::default();
        config.apply(ConfigUpdate::Participants(0)).unwrap();
        assert_eq!(config.participants, 1);
        config.apply(ConfigUpdate::Participants(-7)).unwrap();
        assert_eq!(config.participants, 1);
        config.apply(ConfigUpdate::Participants(9)).unwrap();
        assert_eq!(config.participants, 9);
    }

    #[test]
    fn test_custom_rate_clamped() {
        let mut config = MeetingConfig::new(2, CostMethod::Custom);
        config.apply(ConfigUpdate::CustomRate(0.25)).unwrap();
        assert_eq!(config.custom_rate, Some(1.0));
        config.apply(ConfigUpdate::CustomRate(140.0)).unwrap();
        assert_eq!(config.custom_rate, Some(140.0));
    }

    #[test]
    fn test_custom_rate_rejected_for_other_methods() {
        let mut config = MeetingConfig::new(2, CostMethod::FixedRate);
        let err = config.apply(ConfigUpdate::CustomRate(90.0)).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidValue { .. }));
        assert!(config.custom_rate.is_none());
    }

    #[test]
    fn test_switching_away_from_custom_drops_rate() {
        let mut config = MeetingConfig::new(2, CostMethod::Custom);
        config.apply(ConfigUpdate::CustomRate(100.0)).unwrap();

        config.apply(ConfigUpdate::CostMethod(CostMethod::Custom)).unwrap();
        assert_eq!(config.custom_rate, Some(100.0));

        config.apply(ConfigUpdate::CostMethod(CostMethod::RoleBased)).unwrap();
        assert!(config.custom_rate.is_none());
    }

    #[test]
    fn test_empty_title_falls_back_to_default() {
        let mut config = MeetingConfig::default();
        config.apply(ConfigUpdate::Title("  Sprint review ".into())).unwrap();
        assert_eq!(config.title, "Sprint review");
        config.apply(ConfigUpdate::Title("   ".into())).unwrap();
        assert_eq!(config.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_with_update_leaves_original() {
        let config = MeetingConfig::new(4, CostMethod::FixedRate);
        let next = config.with_update(ConfigUpdate::Participants(8)).unwrap();
        assert_eq!(config.participants, 4);
        assert_eq!(next.participants, 8);
    }

    #[test]
    fn test_update_from_field() {
        assert_eq!(
            ConfigUpdate::from_field("participants", &json!(6)).unwrap(),
            ConfigUpdate::Participants(6)
        );
        assert_eq!(
            ConfigUpdate::from_field("participants", &json!("3")).unwrap(),
            ConfigUpdate::Participants(3)
        );
        assert_eq!(
            ConfigUpdate::from_field("costMethod", &json!("role-based")).unwrap(),
            ConfigUpdate::CostMethod(CostMethod::RoleBased)
        );
        assert_eq!(
            ConfigUpdate::from_field("customRate", &json!(95.5)).unwrap(),
            ConfigUpdate::CustomRate(95.5)
        );
        assert_eq!(
            ConfigUpdate::from_field("type", &json!("training")).unwrap(),
            ConfigUpdate::MeetingType(MeetingType::Training)
        );
    }

    #[test]
    fn test_update_from_field_errors() {
        assert_eq!(
            ConfigUpdate::from_field("budget", &json!(1)).unwrap_err(),
            TrackerError::InvalidField("budget".into())
        );
        assert!(ConfigUpdate::from_field("participants", &json!("many")).is_err());
        assert!(ConfigUpdate::from_field("type", &json!("party")).is_err());
        assert!(ConfigUpdate::from_field("title", &json!(12)).is_err());
    }

    #[test]
    fn test_meeting_type_serialization() {
        let json = serde_json::to_string(&MeetingType::ClientMeeting).unwrap();
        assert_eq!(json, "\"client-meeting\"");
        assert_eq!(MeetingType::parse("calendar-import"), Some(MeetingType::CalendarImport));
    }
}
