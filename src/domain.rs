use crate::funnel::{FunnelCounters, FunnelSource};
use crate::rhi::RhiMetricSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Navigator,
    Pilot,
    Group,
    Broker,
}

impl EntityKind {
    pub const fn ordered() -> [Self; 4] {
        [Self::Navigator, Self::Pilot, Self::Group, Self::Broker]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Navigator => "Navigator",
            Self::Pilot => "Pilot",
            Self::Group => "Group",
            Self::Broker => "Broker",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "navigator" | "navigators" => Some(Self::Navigator),
            "pilot" | "pilots" => Some(Self::Pilot),
            "group" | "groups" => Some(Self::Group),
            "broker" | "brokers" => Some(Self::Broker),
            _ => None,
        }
    }
}

/// Raw numeric fields consumed by the composite profiles. Missing values are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetrics {
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub win_rate_pct: f64,
    #[serde(default)]
    pub max_drawdown_pct: f64,
    #[serde(default)]
    pub avg_leverage: f64,
    #[serde(default)]
    pub return_12m_pct: f64,
    #[serde(default)]
    pub months_active: f64,
    #[serde(default)]
    pub retention_30d_pct: f64,
    #[serde(default)]
    pub members: u64,
    #[serde(default)]
    pub high_harm_member_pct: f64,
    #[serde(default)]
    pub engagement_pct: f64,
}

/// Read-only record for a navigator, pilot, group or broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntity {
    pub id: String,
    pub name: String,
    pub kind: EntityKind,
    pub metrics: EntityMetrics,
    /// Existing `pilotScore` / `groupScore` carried by the source data.
    pub baseline_score: Option<u16>,
    pub funnel: Option<FunnelCounters>,
}

impl ScoredEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            metrics: EntityMetrics::default(),
            baseline_score: None,
            funnel: None,
        }
    }

    pub fn with_metrics(mut self, metrics: EntityMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_baseline_score(mut self, score: u16) -> Self {
        self.baseline_score = Some(score);
        self
    }

    pub fn with_funnel(mut self, counters: FunnelCounters) -> Self {
        self.funnel = Some(counters);
        self
    }

    /// Explicit counters win; otherwise the funnel is inferred from followers.
    pub fn funnel_source(&self) -> FunnelSource {
        match self.funnel {
            Some(counters) => FunnelSource::Explicit(counters),
            None => FunnelSource::InferredFromFollowers(self.metrics.followers),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerRecord {
    pub id: String,
    pub name: String,
    pub rhi: RhiMetricSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funnel_source_prefers_explicit_counters() {
        let counters = FunnelCounters::new(100, 60, 40, 30);
        let entity = ScoredEntity::new("n-1", "Atlas", EntityKind::Navigator)
            .with_metrics(EntityMetrics {
                followers: 900,
                ..EntityMetrics::default()
            })
            .with_funnel(counters);
        assert_eq!(entity.funnel_source(), FunnelSource::Explicit(counters));
    }

    #[test]
    fn funnel_source_falls_back_to_followers() {
        let entity = ScoredEntity::new("p-1", "Kite", EntityKind::Pilot).with_metrics(
            EntityMetrics {
                followers: 1200,
                ..EntityMetrics::default()
            },
        );
        assert_eq!(
            entity.funnel_source(),
            FunnelSource::InferredFromFollowers(1200)
        );
    }

    #[test]
    fn kind_parsing_accepts_plurals() {
        assert_eq!(EntityKind::parse(" Pilots "), Some(EntityKind::Pilot));
        assert_eq!(EntityKind::parse("desk"), None);
    }
}
