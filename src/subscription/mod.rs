//! Subscription tiers and feature gating.
//!
//! Tier information comes from an external billing/auth provider. Here it is
//! plain data: a [`SubscriptionInfo`] value loaded from config and handed to
//! whatever needs it. All gating goes through [`has_access`].

use serde::{Deserialize, Serialize};

/// Ordered subscription tier. `Free < Premium < Enterprise`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Premium,
    Enterprise,
}

impl Tier {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Self::Free),
            "premium" => Some(Self::Premium),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
        }
    }
}

/// Billing status as reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Trialing,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }
}

/// Gated product features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    CostTracking,
    MeetingHistory,
    CostTrend,
    Analytics,
    CalendarImport,
    TeamReports,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::CostTracking,
        Feature::MeetingHistory,
        Feature::CostTrend,
        Feature::Analytics,
        Feature::CalendarImport,
        Feature::TeamReports,
    ];

    pub fn required_tier(&self) -> Tier {
        match self {
            Self::CostTracking | Self::MeetingHistory => Tier::Free,
            Self::CostTrend | Self::Analytics | Self::CalendarImport => Tier::Premium,
            Self::TeamReports => Tier::Enterprise,
        }
    }
}

/// Whether `current` satisfies a feature that needs `required`.
pub fn has_access(required: Tier, current: Tier) -> bool {
    current >= required
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionInfo {
    pub tier: Tier,
    pub status: SubscriptionStatus,
}

impl SubscriptionInfo {
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            status: SubscriptionStatus::Active,
        }
    }

    /// Tier that is actually honoured. Lapsed subscriptions fall back to free.
    pub fn effective_tier(&self) -> Tier {
        if self.status.is_active() {
            self.tier
        } else {
            Tier::Free
        }
    }

    pub fn can_use(&self, feature: Feature) -> bool {
        has_access(feature.required_tier(), self.effective_tier())
    }

    pub fn accessible_features(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|feature| self.can_use(*feature))
            .collect()
    }
}
