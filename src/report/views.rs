use crate::domain::EntityKind;
use crate::funnel::{FunnelStage, Timeframe};
use crate::rhi::{RhiBand, RhiPoint};
use crate::scoring::{CompositeScore, FactorContribution, ValueTier};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub kind: EntityKind,
    pub kind_label: &'static str,
    pub value_score: CompositeScore,
    pub baseline_score: CompositeScore,
    pub rank: usize,
    pub tier: ValueTier,
    pub tier_label: &'static str,
    pub trend: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunnelView {
    pub timeframe: Timeframe,
    pub timeframe_label: &'static str,
    pub reference: Timeframe,
    pub reference_label: &'static str,
    pub stages: Vec<FunnelStage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrokerHarmEntry {
    pub id: String,
    pub name: String,
    pub rhi: CompositeScore,
    pub band: RhiBand,
    pub band_label: &'static str,
    /// 1 is the most harmful broker.
    pub rank: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketHarmView {
    pub rhi: CompositeScore,
    pub band: RhiBand,
    pub band_label: &'static str,
    pub from_brokers: usize,
    pub factors: Vec<FactorContribution>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub funnel: FunnelView,
    pub brokers: Vec<BrokerHarmEntry>,
    pub market_rhi: MarketHarmView,
    pub rhi_series: Vec<RhiPoint>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardInsights {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended_actions: Vec<String>,
}
