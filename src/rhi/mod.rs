//! Retail Harm Index: a seven-factor harm composite on the 0–1000 axis.

mod band;
mod history;

pub use band::RhiBand;
pub use history::{generate_series, RhiPoint, SeriesConfig, VolatilityEvent, MAX_SERIES_DAYS};

use crate::scoring::{
    aggregate, aggregate_with_breakdown, Aggregation, CompositeScore, Direction, FactorScale,
    FactorSpec, WeightedFactor,
};
use serde::{Deserialize, Serialize};

/// The seven named inputs of the index. Percentages are 0–100, time to
/// failure is in days and the herding score is already on the 0–1000 axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RhiMetricSet {
    pub avg_leverage: f64,
    pub high_harm_score_pct: f64,
    pub median_time_to_failure: f64,
    pub herding_score: f64,
    pub stop_loss_usage_rate: f64,
    pub volatility_exposure_pct: f64,
    pub offshore_exposure_pct: f64,
}

impl RhiMetricSet {
    /// Market-wide reference level shown on the dashboard.
    pub const fn baseline() -> Self {
        Self {
            avg_leverage: 52.0,
            high_harm_score_pct: 37.5,
            median_time_to_failure: 28.0,
            herding_score: 580.0,
            stop_loss_usage_rate: 42.7,
            volatility_exposure_pct: 44.4,
            offshore_exposure_pct: 65.4,
        }
    }

    fn raw_values(&self) -> [f64; 7] {
        [
            self.avg_leverage,
            self.high_harm_score_pct,
            self.median_time_to_failure,
            self.herding_score,
            self.stop_loss_usage_rate,
            self.volatility_exposure_pct,
            self.offshore_exposure_pct,
        ]
    }

    /// Equal-weighted mean of several metric sets, `None` when empty.
    pub fn mean(sets: &[RhiMetricSet]) -> Option<Self> {
        if sets.is_empty() {
            return None;
        }

        let mut totals = [0.0_f64; 7];
        for set in sets {
            for (total, value) in totals.iter_mut().zip(set.raw_values()) {
                *total += value;
            }
        }
        let n = sets.len() as f64;
        let [lev, harm, ttf, herd, stop, vol, off] = totals.map(|total| total / n);

        Some(Self {
            avg_leverage: lev,
            high_harm_score_pct: harm,
            median_time_to_failure: ttf,
            herding_score: herd,
            stop_loss_usage_rate: stop,
            volatility_exposure_pct: vol,
            offshore_exposure_pct: off,
        })
    }
}

impl Default for RhiMetricSet {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Fixed policy configuration; weights sum to exactly 1.0.
pub const RHI_FACTORS: [FactorSpec; 7] = [
    FactorSpec {
        name: "leverage",
        weight: 0.15,
        scale: FactorScale::linear(10.0, 200.0, Direction::Ascending),
    },
    FactorSpec {
        name: "high_harm",
        weight: 0.20,
        scale: FactorScale::linear(0.0, 100.0, Direction::Ascending),
    },
    FactorSpec {
        name: "time_to_failure",
        weight: 0.15,
        scale: FactorScale::linear(7.0, 180.0, Direction::Descending),
    },
    FactorSpec {
        name: "herding",
        weight: 0.15,
        scale: FactorScale::PassThrough,
    },
    FactorSpec {
        name: "stop_loss",
        weight: 0.15,
        scale: FactorScale::linear(0.0, 100.0, Direction::Descending),
    },
    FactorSpec {
        name: "volatility",
        weight: 0.10,
        scale: FactorScale::linear(0.0, 100.0, Direction::Ascending),
    },
    FactorSpec {
        name: "offshore",
        weight: 0.10,
        scale: FactorScale::linear(0.0, 100.0, Direction::Ascending),
    },
];

fn rhi_factors(metrics: &RhiMetricSet) -> Vec<WeightedFactor> {
    RHI_FACTORS
        .iter()
        .zip(metrics.raw_values())
        .map(|(spec, raw)| WeightedFactor::new(spec.name, raw, spec.weight, spec.scale))
        .collect()
}

pub fn compute_rhi(metrics: &RhiMetricSet) -> CompositeScore {
    aggregate(&rhi_factors(metrics))
}

pub fn rhi_breakdown(metrics: &RhiMetricSet) -> Aggregation {
    aggregate_with_breakdown(&rhi_factors(metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{validate_weights, weights_of, STRICT_WEIGHT_TOLERANCE};

    #[test]
    fn baseline_matches_golden_value() {
        assert_eq!(compute_rhi(&RhiMetricSet::baseline()).value(), 523);
    }

    #[test]
    fn weights_sum_to_one() {
        validate_weights(&weights_of(&RHI_FACTORS), STRICT_WEIGHT_TOLERANCE)
            .expect("rhi weights sum to one");
    }

    #[test]
    fn breakdown_exposes_factor_sub_scores() {
        let breakdown = rhi_breakdown(&RhiMetricSet::baseline());
        let sub = |name: &str| {
            breakdown
                .contributions
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.sub_score)
                .expect("factor present")
        };
        assert!((sub("leverage") - 221.05).abs() < 0.01);
        assert_eq!(sub("high_harm"), 375.0);
        assert!((sub("time_to_failure") - 878.61).abs() < 0.01);
        assert_eq!(sub("herding"), 580.0);
        assert!((sub("stop_loss") - 573.0).abs() < 1e-9);
    }

    #[test]
    fn worst_case_inputs_saturate() {
        let worst = RhiMetricSet {
            avg_leverage: 500.0,
            high_harm_score_pct: 100.0,
            median_time_to_failure: 1.0,
            herding_score: 5000.0,
            stop_loss_usage_rate: 0.0,
            volatility_exposure_pct: 100.0,
            offshore_exposure_pct: 100.0,
        };
        assert_eq!(compute_rhi(&worst), CompositeScore::MAX);
    }

    #[test]
    fn mean_of_sets_is_fieldwise() {
        let mut other = RhiMetricSet::baseline();
        other.avg_leverage = 100.0;
        let mean = RhiMetricSet::mean(&[RhiMetricSet::baseline(), other]).expect("non-empty");
        assert_eq!(mean.avg_leverage, 76.0);
        assert_eq!(mean.herding_score, 580.0);
        assert!(RhiMetricSet::mean(&[]).is_none());
    }
}
