//! Fixed factor tables for the entity composites.
//!
//! PilotScore rates a lead trader's record, GroupScore rates a copy group,
//! and ValueScore ranks any entity for the leaderboard using the other two
//! as its baseline input.

use super::aggregator::{aggregate, aggregate_with_breakdown, Aggregation, FactorScale, WeightedFactor};
use super::normalizer::{CompositeScore, Direction};
use crate::domain::{EntityKind, EntityMetrics, ScoredEntity};

/// One row of a fixed composite configuration.
#[derive(Debug, Clone, Copy)]
pub struct FactorSpec {
    pub name: &'static str,
    pub weight: f64,
    pub scale: FactorScale,
}

impl FactorSpec {
    const fn new(name: &'static str, weight: f64, scale: FactorScale) -> Self {
        Self {
            name,
            weight,
            scale,
        }
    }

    fn with_raw(&self, raw_value: f64) -> WeightedFactor {
        WeightedFactor::new(self.name, raw_value, self.weight, self.scale)
    }
}

pub const PILOT_SCORE_FACTORS: [FactorSpec; 6] = [
    FactorSpec::new("win_rate", 0.25, FactorScale::linear(30.0, 80.0, Direction::Ascending)),
    FactorSpec::new("max_drawdown", 0.20, FactorScale::linear(5.0, 60.0, Direction::Descending)),
    FactorSpec::new("avg_leverage", 0.15, FactorScale::linear(1.0, 100.0, Direction::Descending)),
    FactorSpec::new("followers", 0.15, FactorScale::linear(0.0, 50_000.0, Direction::Ascending)),
    FactorSpec::new("return_12m", 0.15, FactorScale::linear(-20.0, 80.0, Direction::Ascending)),
    FactorSpec::new("months_active", 0.10, FactorScale::linear(0.0, 60.0, Direction::Ascending)),
];

pub const GROUP_SCORE_FACTORS: [FactorSpec; 4] = [
    FactorSpec::new("members", 0.25, FactorScale::linear(0.0, 20_000.0, Direction::Ascending)),
    FactorSpec::new("avg_member_return", 0.25, FactorScale::linear(-20.0, 60.0, Direction::Ascending)),
    FactorSpec::new("high_harm_members", 0.30, FactorScale::linear(0.0, 100.0, Direction::Descending)),
    FactorSpec::new("engagement", 0.20, FactorScale::linear(0.0, 100.0, Direction::Ascending)),
];

pub const VALUE_SCORE_FACTORS: [FactorSpec; 4] = [
    FactorSpec::new("revenue", 0.35, FactorScale::linear(0.0, 500_000.0, Direction::Ascending)),
    FactorSpec::new("followers", 0.20, FactorScale::linear(0.0, 50_000.0, Direction::Ascending)),
    FactorSpec::new("retention_30d", 0.20, FactorScale::linear(0.0, 100.0, Direction::Ascending)),
    FactorSpec::new("baseline_score", 0.25, FactorScale::PassThrough),
];

pub fn weights_of(factors: &[FactorSpec]) -> Vec<f64> {
    factors.iter().map(|factor| factor.weight).collect()
}

fn bind(factors: &[FactorSpec], raw: &[f64]) -> Vec<WeightedFactor> {
    factors
        .iter()
        .zip(raw)
        .map(|(spec, value)| spec.with_raw(*value))
        .collect()
}

fn pilot_factors(metrics: &EntityMetrics) -> Vec<WeightedFactor> {
    bind(
        &PILOT_SCORE_FACTORS,
        &[
            metrics.win_rate_pct,
            metrics.max_drawdown_pct,
            metrics.avg_leverage,
            metrics.followers as f64,
            metrics.return_12m_pct,
            metrics.months_active,
        ],
    )
}

fn group_factors(metrics: &EntityMetrics) -> Vec<WeightedFactor> {
    bind(
        &GROUP_SCORE_FACTORS,
        &[
            metrics.members as f64,
            metrics.return_12m_pct,
            metrics.high_harm_member_pct,
            metrics.engagement_pct,
        ],
    )
}

pub fn pilot_score(metrics: &EntityMetrics) -> CompositeScore {
    aggregate(&pilot_factors(metrics))
}

pub fn group_score(metrics: &EntityMetrics) -> CompositeScore {
    aggregate(&group_factors(metrics))
}

/// The entity's own composite: the stored field when present, else computed.
pub fn baseline_score(entity: &ScoredEntity) -> CompositeScore {
    if let Some(stored) = entity.baseline_score {
        return CompositeScore::new(stored);
    }

    match entity.kind {
        EntityKind::Group => group_score(&entity.metrics),
        EntityKind::Navigator | EntityKind::Pilot | EntityKind::Broker => {
            pilot_score(&entity.metrics)
        }
    }
}

fn value_factors(entity: &ScoredEntity) -> Vec<WeightedFactor> {
    let metrics = &entity.metrics;
    bind(
        &VALUE_SCORE_FACTORS,
        &[
            metrics.revenue,
            metrics.followers as f64,
            metrics.retention_30d_pct,
            baseline_score(entity).as_f64(),
        ],
    )
}

pub fn value_score(entity: &ScoredEntity) -> CompositeScore {
    aggregate(&value_factors(entity))
}

pub fn value_breakdown(entity: &ScoredEntity) -> Aggregation {
    aggregate_with_breakdown(&value_factors(entity))
}
