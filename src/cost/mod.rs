//! Cost calculation policy.
//!
//! Maps `(elapsed seconds, MeetingConfig)` to a cost in currency units.
//! Everything here is pure: no clocks, no state.

pub mod rates;

pub use rates::{CostMethod, RateTable, RoleRate};

use serde::{Deserialize, Serialize};

use crate::meeting::config::MeetingConfig;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Cost of a meeting that has been running for `elapsed_seconds` under `config`.
///
/// Never negative; a negative or non-finite duration prices as zero.
pub fn calculate_cost(elapsed_seconds: f64, config: &MeetingConfig, rates: &RateTable) -> f64 {
    if !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
        return 0.0;
    }

    let hourly_rate = rates.hourly_rate(config.cost_method, config.custom_rate);
    let cost = hourly_rate * (elapsed_seconds / SECONDS_PER_HOUR) * config.participants as f64;
    cost.max(0.0)
}

/// Derived efficiency classification based on cost per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EfficiencyRating {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "Needs Optimization")]
    NeedsOptimization,
}

impl EfficiencyRating {
    /// Classify a finished or running meeting.
    ///
    /// Returns `None` for a zero-length meeting, where cost per minute is undefined.
    pub fn classify(total_cost: f64, elapsed_seconds: f64) -> Option<Self> {
        if elapsed_seconds <= 0.0 {
            return None;
        }

        let cost_per_minute = total_cost / (elapsed_seconds / 60.0);
        if !cost_per_minute.is_finite() {
            return None;
        }

        let rating = if cost_per_minute < 5.0 {
            Self::Excellent
        } else if cost_per_minute < 10.0 {
            Self::Good
        } else if cost_per_minute < 20.0 {
            Self::Fair
        } else {
            Self::NeedsOptimization
        };
        Some(rating)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsOptimization => "Needs Optimization",
        }
    }
}

impl std::fmt::Display for EfficiencyRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(method: CostMethod, participants: u32) -> MeetingConfig {
        MeetingConfig {
            cost_method: method,
            participants,
            ..MeetingConfig::default()
        }
    }

    #[test]
    fn test_zero_elapsed_costs_nothing() {
        let rates = RateTable::default();
        for method in [
            CostMethod::SalaryBased,
            CostMethod::FixedRate,
            CostMethod::RoleBased,
            CostMethod::Custom,
            CostMethod::Other,
        ] {
            assert_eq!(calculate_cost(0.0, &config(method, 12), &rates), 0.0);
        }
    }

    #[test]
    fn test_negative_elapsed_clamps_to_zero() {
        let rates = RateTable::default();
        let cost = calculate_cost(-120.0, &config(CostMethod::FixedRate, 3), &rates);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_fixed_rate_one_hour() {
        let rates = RateTable::default();
        let cost = calculate_cost(3600.0, &config(CostMethod::FixedRate, 5), &rates);
        assert!((cost - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_salary_based_half_hour() {
        let rates = RateTable::default();
        let cost = calculate_cost(1800.0, &config(CostMethod::SalaryBased, 2), &rates);
        assert!((cost - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_role_based_uses_weighted_blend() {
        let rates = RateTable::default();
        let cost = calculate_cost(3600.0, &config(CostMethod::RoleBased, 1), &rates);
        assert!((cost - rates.role_based_rate()).abs() < 1e-9);
        assert!((cost - 86.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_rate_and_fallback() {
        let rates = RateTable::default();
        let mut cfg = config(CostMethod::Custom, 4);
        cfg.custom_rate = Some(120.0);
        assert!((calculate_cost(3600.0, &cfg, &rates) - 480.0).abs() < 1e-9);

        cfg.custom_rate = None;
        assert!((calculate_cost(3600.0, &cfg, &rates) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_unrecognized_method_uses_default_rate() {
        let rates = RateTable::default();
        let cost = calculate_cost(3600.0, &config(CostMethod::Other, 1), &rates);
        assert!((cost - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_efficiency_thresholds() {
        // 60s meetings so cost == cost per minute
        assert_eq!(
            EfficiencyRating::classify(4.99, 60.0),
            Some(EfficiencyRating::Excellent)
        );
        assert_eq!(
            EfficiencyRating::classify(5.0, 60.0),
            Some(EfficiencyRating::Good)
        );
        assert_eq!(
            EfficiencyRating::classify(10.0, 60.0),
            Some(EfficiencyRating::Fair)
        );
        assert_eq!(
            EfficiencyRating::classify(20.0, 60.0),
            Some(EfficiencyRating::NeedsOptimization)
        );
    }

    #[test]
    fn test_efficiency_undefined_for_zero_duration() {
        assert_eq!(EfficiencyRating::classify(0.0, 0.0), None);
        assert_eq!(EfficiencyRating::classify(10.0, 0.0), None);
    }

    #[test]
    fn test_efficiency_serialization() {
        let json = serde_json::to_string(&EfficiencyRating::NeedsOptimization).unwrap();
        assert_eq!(json, "\"Needs Optimization\"");
        assert_eq!(EfficiencyRating::Fair.to_string(), "Fair");
    }
}
