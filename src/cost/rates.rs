//! Hourly rate policy per cost method.

use serde::{Deserialize, Serialize};

/// How the per-participant hourly rate is chosen.
///
/// Parsing is lenient: any unrecognized name becomes [`CostMethod::Other`],
/// which is priced at the default rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CostMethod {
    SalaryBased,
    FixedRate,
    RoleBased,
    Custom,
    Other,
}

impl CostMethod {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "salary-based" | "salary" => Self::SalaryBased,
            "fixed-rate" | "fixed" => Self::FixedRate,
            "role-based" | "role" => Self::RoleBased,
            "custom" => Self::Custom,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SalaryBased => "salary-based",
            Self::FixedRate => "fixed-rate",
            Self::RoleBased => "role-based",
            Self::Custom => "custom",
            Self::Other => "other",
        }
    }
}

impl From<String> for CostMethod {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<CostMethod> for String {
    fn from(value: CostMethod) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for CostMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the role-based blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRate {
    pub role: String,
    pub hourly_rate: f64,
    pub weight: f64,
}

impl RoleRate {
    fn new(role: &str, hourly_rate: f64, weight: f64) -> Self {
        Self {
            role: role.to_string(),
            hourly_rate,
            weight,
        }
    }
}

/// Rate constants, loaded from the `[rates]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateTable {
    pub salary_based: f64,
    pub fixed_rate: f64,
    /// Used for `custom` without a rate and for unrecognized methods.
    pub default_rate: f64,
    pub role_mix: Vec<RoleRate>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            salary_based: 80.0,
            fixed_rate: 50.0,
            default_rate: 75.0,
            role_mix: vec![
                RoleRate::new("CEO", 200.0, 0.1),
                RoleRate::new("Manager", 100.0, 0.2),
                RoleRate::new("Developer", 80.0, 0.3),
                RoleRate::new("Designer", 70.0, 0.1),
                RoleRate::new("Analyst", 60.0, 0.2),
                RoleRate::new("Intern", 30.0, 0.1),
            ],
        }
    }
}

impl RateTable {
    /// Effective hourly rate per participant.
    pub fn hourly_rate(&self, method: CostMethod, custom_rate: Option<f64>) -> f64 {
        match method {
            CostMethod::SalaryBased => self.salary_based,
            CostMethod::FixedRate => self.fixed_rate,
            CostMethod::RoleBased => self.role_based_rate(),
            CostMethod::Custom => custom_rate.unwrap_or(self.default_rate),
            CostMethod::Other => self.default_rate,
        }
    }

    /// Weighted sum of the role mix. An empty mix falls back to the default rate.
    ///
    /// The default mix sums to 86. Older product copy quoted roughly 89 for the
    /// same weights; 86 is what the weights give, so it is not a rounding bug.
    pub fn role_based_rate(&self) -> f64 {
        if self.role_mix.is_empty() {
            return self.default_rate;
        }
        self.role_mix
            .iter()
            .map(|role| role.hourly_rate * role.weight)
            .sum()
    }
}
