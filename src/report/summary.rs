use super::views::{
    BrokerHarmEntry, DashboardInsights, DashboardSummary, FunnelView, LeaderboardEntry,
    MarketHarmView,
};
use crate::dataset::EntityDataset;
use crate::domain::{EntityKind, ScoredEntity};
use crate::funnel::{build_funnel, FunnelSource, Timeframe};
use crate::rhi::{compute_rhi, generate_series, rhi_breakdown, RhiBand, RhiMetricSet, SeriesConfig};
use crate::scoring::{baseline_score, classify, value_score, CompositeScore, TierCutPoints};
use crate::series::{seeded_trend, DEFAULT_TREND_LENGTH};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Knobs for one dashboard build.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub timeframe: Timeframe,
    pub reference: Timeframe,
    pub series_days: usize,
    pub series_end: NaiveDate,
    pub cut_points: TierCutPoints,
    /// Restrict the leaderboard to one kind; brokers are never on it.
    pub kind: Option<EntityKind>,
}

impl ReportOptions {
    pub fn new(series_end: NaiveDate) -> Self {
        Self {
            timeframe: Timeframe::ThisMonth,
            reference: Timeframe::LastMonth,
            series_days: 90,
            series_end,
            cut_points: TierCutPoints::default(),
            kind: None,
        }
    }
}

pub struct DashboardReport;

impl DashboardReport {
    pub fn build(dataset: &EntityDataset, options: &ReportOptions) -> DashboardSummary {
        let population: Vec<&ScoredEntity> = dataset
            .entities
            .iter()
            .filter(|entity| entity.kind != EntityKind::Broker)
            .filter(|entity| options.kind.map_or(true, |kind| entity.kind == kind))
            .collect();
        debug!(
            entities = population.len(),
            brokers = dataset.brokers.len(),
            "building dashboard"
        );

        DashboardSummary {
            leaderboard: leaderboard(&population, options.cut_points),
            funnel: funnel_view(&population, options.timeframe, options.reference),
            brokers: broker_table(dataset),
            market_rhi: market_view(dataset),
            rhi_series: generate_series(&SeriesConfig::standard(
                options.series_end,
                options.series_days,
            )),
        }
    }
}

impl DashboardSummary {
    pub fn insights(&self) -> DashboardInsights {
        super::generate_insights(self)
    }
}

/// Keeps the first record for each id so every view agrees on which one counts.
fn first_by_id<'a, T>(items: impl IntoIterator<Item = &'a T>, id: impl Fn(&T) -> &str) -> Vec<&'a T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let fresh = seen.insert(id(*item).to_string());
            if !fresh {
                warn!(id = id(*item), "duplicate id ignored; first record kept");
            }
            fresh
        })
        .collect()
}

pub fn leaderboard(population: &[&ScoredEntity], cut_points: TierCutPoints) -> Vec<LeaderboardEntry> {
    let unique = first_by_id(population.iter().copied(), |entity| entity.id.as_str());
    let scores: HashMap<&str, CompositeScore> = unique
        .iter()
        .map(|entity| (entity.id.as_str(), value_score(entity)))
        .collect();
    let classification = classify(
        &unique,
        |entity| entity.id.as_str(),
        |entity| scores.get(entity.id.as_str()).map_or(0.0, |score| score.as_f64()),
        cut_points,
    );
    let by_id: HashMap<&str, &ScoredEntity> = unique
        .iter()
        .map(|entity| (entity.id.as_str(), *entity))
        .collect();

    classification
        .entries()
        .iter()
        .filter_map(|entry| {
            let entity = by_id.get(entry.id.as_str())?;
            let value = scores.get(entry.id.as_str()).copied().unwrap_or_default();
            let tier = cut_points.tier_for_rank(entry.rank);
            Some(LeaderboardEntry {
                id: entity.id.clone(),
                name: entity.name.clone(),
                kind: entity.kind,
                kind_label: entity.kind.label(),
                value_score: value,
                baseline_score: baseline_score(entity),
                rank: entry.rank,
                tier,
                tier_label: tier.label(),
                trend: seeded_trend(&entity.id, value.as_f64(), DEFAULT_TREND_LENGTH),
            })
        })
        .collect()
}

pub fn funnel_view(
    population: &[&ScoredEntity],
    timeframe: Timeframe,
    reference: Timeframe,
) -> FunnelView {
    let sources: Vec<FunnelSource> = population
        .iter()
        .map(|entity| entity.funnel_source())
        .collect();

    FunnelView {
        timeframe,
        timeframe_label: timeframe.label(),
        reference,
        reference_label: reference.label(),
        stages: build_funnel(&sources, timeframe, reference),
    }
}

pub fn broker_table(dataset: &EntityDataset) -> Vec<BrokerHarmEntry> {
    let brokers = first_by_id(&dataset.brokers, |broker| broker.id.as_str());
    let classification = classify(
        &brokers,
        |broker| broker.id.as_str(),
        |broker| compute_rhi(&broker.rhi).as_f64(),
        TierCutPoints::default(),
    );

    classification
        .entries()
        .iter()
        .filter_map(|entry| {
            let broker = brokers.iter().find(|broker| broker.id == entry.id)?;
            let rhi = CompositeScore::from_raw(entry.score);
            let band = RhiBand::from_score(rhi);
            Some(BrokerHarmEntry {
                id: broker.id.clone(),
                name: broker.name.clone(),
                rhi,
                band,
                band_label: band.label(),
                rank: entry.rank,
            })
        })
        .collect()
}

/// Index for the whole market: mean broker metrics, or the reference baseline.
pub fn market_view(dataset: &EntityDataset) -> MarketHarmView {
    let sets: Vec<RhiMetricSet> = first_by_id(&dataset.brokers, |broker| broker.id.as_str())
        .into_iter()
        .map(|broker| broker.rhi)
        .collect();
    let metrics = RhiMetricSet::mean(&sets).unwrap_or_else(RhiMetricSet::baseline);
    let aggregation = rhi_breakdown(&metrics);
    let band = RhiBand::from_score(aggregation.score);

    MarketHarmView {
        rhi: aggregation.score,
        band,
        band_label: band.label(),
        from_brokers: sets.len(),
        factors: aggregation.contributions,
    }
}
