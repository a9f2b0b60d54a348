//! What-if model for regulatory levers.
//!
//! Each simulated metric is the baseline times a product of per-lever
//! multipliers, all computed from the same lever record in one pass, so there
//! is no application order. The per-lever breakdown varies one lever at a
//! time and is not additive to the joint result: the multipliers compound and
//! the index clamps.

mod levers;

pub use levers::{LeverError, LeverKind, PolicyLevers};

use crate::rhi::{compute_rhi, RhiBand, RhiMetricSet};
use crate::scoring::CompositeScore;
use serde::{Deserialize, Serialize};

const LEVERAGE_CAP_REFERENCE: f64 = 200.0;
const LEVERAGE_CAP_ELASTICITY: f64 = 0.35;
const HIGH_HARM_LEVERAGE_SENSITIVITY: f64 = 0.5;
const HIGH_HARM_STOP_LOSS_SENSITIVITY: f64 = 0.004;
const TTF_LEVERAGE_SENSITIVITY: f64 = 0.8;
const TTF_STOP_LOSS_SENSITIVITY: f64 = 0.012;
const VOLATILITY_HERDING_SENSITIVITY: f64 = 0.25;
const OFFSHORE_ENFORCEMENT_SENSITIVITY: f64 = 0.6;
const HERDING_MAX: f64 = 1000.0;

fn percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    AvgLeverage,
    HighHarmScorePct,
    MedianTimeToFailure,
    HerdingScore,
    StopLossUsageRate,
    VolatilityExposurePct,
    OffshoreExposurePct,
}

impl MetricKind {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::AvgLeverage,
            Self::HighHarmScorePct,
            Self::MedianTimeToFailure,
            Self::HerdingScore,
            Self::StopLossUsageRate,
            Self::VolatilityExposurePct,
            Self::OffshoreExposurePct,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AvgLeverage => "Average leverage",
            Self::HighHarmScorePct => "High-harm traders (%)",
            Self::MedianTimeToFailure => "Median time to failure (days)",
            Self::HerdingScore => "Herding score",
            Self::StopLossUsageRate => "Stop-loss usage (%)",
            Self::VolatilityExposurePct => "Volatility exposure (%)",
            Self::OffshoreExposurePct => "Offshore exposure (%)",
        }
    }

    pub fn read(self, metrics: &RhiMetricSet) -> f64 {
        match self {
            Self::AvgLeverage => metrics.avg_leverage,
            Self::HighHarmScorePct => metrics.high_harm_score_pct,
            Self::MedianTimeToFailure => metrics.median_time_to_failure,
            Self::HerdingScore => metrics.herding_score,
            Self::StopLossUsageRate => metrics.stop_loss_usage_rate,
            Self::VolatilityExposurePct => metrics.volatility_exposure_pct,
            Self::OffshoreExposurePct => metrics.offshore_exposure_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDelta {
    pub metric: MetricKind,
    pub label: &'static str,
    pub baseline: f64,
    pub simulated: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreDelta {
    pub baseline: CompositeScore,
    pub simulated: CompositeScore,
    pub delta: i32,
    pub baseline_band: RhiBand,
    pub simulated_band: RhiBand,
}

impl ScoreDelta {
    fn between(baseline: CompositeScore, simulated: CompositeScore) -> Self {
        Self {
            baseline,
            simulated,
            delta: i32::from(simulated.value()) - i32::from(baseline.value()),
            baseline_band: RhiBand::from_score(baseline),
            simulated_band: RhiBand::from_score(simulated),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedOutcome {
    /// Levers as applied, after clamping.
    pub levers: PolicyLevers,
    pub simulated_metrics: RhiMetricSet,
    pub metrics: Vec<MetricDelta>,
    pub rhi: ScoreDelta,
}

impl SimulatedOutcome {
    pub fn metric(&self, kind: MetricKind) -> Option<&MetricDelta> {
        self.metrics.iter().find(|delta| delta.metric == kind)
    }
}

/// Marginal effect of one lever with every other lever held neutral.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeverContribution {
    pub lever: LeverKind,
    pub description: String,
    pub rhi_impact: i32,
    pub ttf_impact: f64,
}

/// Multipliers derived from one lever record.
struct Adjustments {
    leverage: f64,
    leverage_cap: f64,
    high_harm: f64,
    ttf: f64,
    stop_loss_points: f64,
    herding: f64,
    volatility: f64,
    offshore: f64,
}

impl Adjustments {
    fn from_levers(levers: &PolicyLevers) -> Self {
        let cap = levers.max_leverage_cap;
        let leverage = (cap / LEVERAGE_CAP_REFERENCE).powf(LEVERAGE_CAP_ELASTICITY);
        let relief = 1.0 - leverage;
        let stop_loss = levers.stop_loss_adoption_increase;
        let herding_cut = levers.herding_reduction_pct / 100.0;
        let enforcement = levers.offshore_enforcement_pct / 100.0;

        Self {
            leverage,
            leverage_cap: cap,
            high_harm: (1.0 - HIGH_HARM_LEVERAGE_SENSITIVITY * relief)
                * (1.0 - HIGH_HARM_STOP_LOSS_SENSITIVITY * stop_loss),
            ttf: (1.0 + TTF_LEVERAGE_SENSITIVITY * relief)
                * (1.0 + TTF_STOP_LOSS_SENSITIVITY * stop_loss),
            stop_loss_points: stop_loss,
            herding: 1.0 - herding_cut,
            volatility: 1.0 - VOLATILITY_HERDING_SENSITIVITY * herding_cut,
            offshore: 1.0 - OFFSHORE_ENFORCEMENT_SENSITIVITY * enforcement,
        }
    }

    fn apply(&self, baseline: &RhiMetricSet) -> RhiMetricSet {
        let scaled_leverage = baseline.avg_leverage * self.leverage;
        let avg_leverage = if self.leverage_cap < LEVERAGE_CAP_REFERENCE {
            scaled_leverage.min(self.leverage_cap)
        } else {
            scaled_leverage
        };
        let stop_loss_usage_rate = if self.stop_loss_points > 0.0 {
            let headroom = (100.0 - baseline.stop_loss_usage_rate).max(0.0);
            percent(baseline.stop_loss_usage_rate + self.stop_loss_points.min(headroom))
        } else {
            baseline.stop_loss_usage_rate
        };

        RhiMetricSet {
            avg_leverage,
            high_harm_score_pct: scale(baseline.high_harm_score_pct, self.high_harm, 100.0),
            median_time_to_failure: scale(baseline.median_time_to_failure, self.ttf, f64::MAX),
            herding_score: scale(baseline.herding_score, self.herding, HERDING_MAX),
            stop_loss_usage_rate,
            volatility_exposure_pct: scale(baseline.volatility_exposure_pct, self.volatility, 100.0),
            offshore_exposure_pct: scale(baseline.offshore_exposure_pct, self.offshore, 100.0),
        }
    }
}

/// Scales a metric and bounds it to `0..=max`. A neutral multiplier passes the
/// value through, so metrics no lever touches keep their baseline.
fn scale(value: f64, multiplier: f64, max: f64) -> f64 {
    if multiplier == 1.0 {
        value
    } else {
        (value * multiplier).clamp(0.0, max)
    }
}

/// Baseline metrics after the levers take effect. Levers are clamped first.
pub fn apply_levers(levers: &PolicyLevers, baseline: &RhiMetricSet) -> RhiMetricSet {
    Adjustments::from_levers(&levers.clamped()).apply(baseline)
}

pub fn simulate(levers: &PolicyLevers, baseline: &RhiMetricSet) -> SimulatedOutcome {
    let levers = levers.clamped();
    let simulated_metrics = Adjustments::from_levers(&levers).apply(baseline);

    let metrics = MetricKind::ordered()
        .into_iter()
        .map(|metric| {
            let before = metric.read(baseline);
            let after = metric.read(&simulated_metrics);
            MetricDelta {
                metric,
                label: metric.label(),
                baseline: before,
                simulated: after,
                delta: after - before,
            }
        })
        .collect();

    let rhi = ScoreDelta::between(compute_rhi(baseline), compute_rhi(&simulated_metrics));
    tracing::debug!(
        rhi_before = rhi.baseline.value(),
        rhi_after = rhi.simulated.value(),
        "policy scenario simulated"
    );

    SimulatedOutcome {
        levers,
        simulated_metrics,
        metrics,
        rhi,
    }
}

/// Ceteris-paribus contribution of each lever.
pub fn breakdown(levers: &PolicyLevers, baseline: &RhiMetricSet) -> Vec<LeverContribution> {
    let levers = levers.clamped();
    LeverKind::ordered()
        .into_iter()
        .map(|kind| {
            let outcome = simulate(&levers.isolate(kind), baseline);
            let ttf_impact = outcome
                .metric(MetricKind::MedianTimeToFailure)
                .map(|delta| delta.delta)
                .unwrap_or(0.0);
            LeverContribution {
                lever: kind,
                description: kind.describe(levers.get(kind)),
                rhi_impact: outcome.rhi.delta,
                ttf_impact,
            }
        })
        .collect()
}
