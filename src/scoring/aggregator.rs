use super::normalizer::{normalize, pass_through, CompositeScore, Direction, ScoreBounds};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Deviation from a unit weight sum tolerated before a configuration warning.
pub const WEIGHT_TOLERANCE: f64 = 0.01;

/// Tolerance used when fixed factor tables are validated.
pub const STRICT_WEIGHT_TOLERANCE: f64 = 0.001;

/// How a factor's raw value reaches the 0–1000 axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactorScale {
    Linear {
        bounds: ScoreBounds,
        direction: Direction,
    },
    /// Raw value is already a 0–1000 score; only clamped.
    PassThrough,
}

impl FactorScale {
    pub const fn linear(lo: f64, hi: f64, direction: Direction) -> Self {
        Self::Linear {
            bounds: ScoreBounds::new(lo, hi),
            direction,
        }
    }

    pub fn score(&self, raw_value: f64) -> f64 {
        match self {
            FactorScale::Linear { bounds, direction } => normalize(raw_value, *bounds, *direction),
            FactorScale::PassThrough => pass_through(raw_value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedFactor {
    pub name: String,
    pub raw_value: f64,
    pub weight: f64,
    pub scale: FactorScale,
}

impl WeightedFactor {
    pub fn new(name: impl Into<String>, raw_value: f64, weight: f64, scale: FactorScale) -> Self {
        Self {
            name: name.into(),
            raw_value,
            weight,
            scale,
        }
    }

    pub fn sub_score(&self) -> f64 {
        self.scale.score(self.raw_value)
    }

    fn usable_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }
}

/// One factor's share of a composite, kept for audit views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub name: String,
    pub sub_score: f64,
    pub weight: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub score: CompositeScore,
    pub contributions: Vec<FactorContribution>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightError {
    #[error("no weights supplied")]
    Empty,
    #[error("weight #{index} is negative or not finite ({value})")]
    Invalid { index: usize, value: f64 },
    #[error("weights sum to {sum:.4}, expected 1.0 within {tolerance}")]
    SumOutOfTolerance { sum: f64, tolerance: f64 },
}

/// Checks that a weight table is usable as-is.
pub fn validate_weights(weights: &[f64], tolerance: f64) -> Result<(), WeightError> {
    if weights.is_empty() {
        return Err(WeightError::Empty);
    }

    if let Some((index, value)) = weights
        .iter()
        .enumerate()
        .find(|(_, weight)| !weight.is_finite() || **weight < 0.0)
    {
        return Err(WeightError::Invalid {
            index,
            value: *value,
        });
    }

    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > tolerance {
        return Err(WeightError::SumOutOfTolerance { sum, tolerance });
    }

    Ok(())
}

/// Sums in ascending order so input order cannot move the rounding.
fn sorted_sum(values: impl Iterator<Item = f64>) -> f64 {
    let mut parts: Vec<f64> = values.collect();
    parts.sort_by(f64::total_cmp);
    parts.iter().sum()
}

/// Weighted composite of the supplied factors.
pub fn aggregate(factors: &[WeightedFactor]) -> CompositeScore {
    aggregate_with_breakdown(factors).score
}

/// Same as [`aggregate`], keeping each factor's normalised share.
///
/// Weights are divided by their sum before use. Negative or non-finite
/// weights count as zero.
pub fn aggregate_with_breakdown(factors: &[WeightedFactor]) -> Aggregation {
    let total_weight = sorted_sum(factors.iter().map(WeightedFactor::usable_weight));

    if total_weight <= 0.0 {
        if !factors.is_empty() {
            warn!(factors = factors.len(), "composite has no usable weight");
        }
        return Aggregation {
            score: CompositeScore::ZERO,
            contributions: factors
                .iter()
                .map(|factor| FactorContribution {
                    name: factor.name.clone(),
                    sub_score: factor.sub_score(),
                    weight: 0.0,
                    contribution: 0.0,
                })
                .collect(),
        };
    }

    if (total_weight - 1.0).abs() > WEIGHT_TOLERANCE {
        warn!(total_weight, "factor weights do not sum to 1.0; normalising");
    }

    let contributions: Vec<FactorContribution> = factors
        .iter()
        .map(|factor| {
            let weight = factor.usable_weight() / total_weight;
            let sub_score = factor.sub_score();
            FactorContribution {
                name: factor.name.clone(),
                sub_score,
                weight,
                contribution: sub_score * weight,
            }
        })
        .collect();

    let raw = sorted_sum(contributions.iter().map(|c| c.contribution));

    Aggregation {
        score: CompositeScore::from_raw(raw),
        contributions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leverage(raw: f64, weight: f64) -> WeightedFactor {
        WeightedFactor::new(
            "leverage",
            raw,
            weight,
            FactorScale::linear(10.0, 200.0, Direction::Ascending),
        )
    }

    fn stop_loss(raw: f64, weight: f64) -> WeightedFactor {
        WeightedFactor::new(
            "stop_loss",
            raw,
            weight,
            FactorScale::linear(0.0, 100.0, Direction::Descending),
        )
    }

    #[test]
    fn combines_weighted_sub_scores() {
        let factors = vec![leverage(200.0, 0.5), stop_loss(100.0, 0.5)];
        assert_eq!(aggregate(&factors).value(), 500);
    }

    #[test]
    fn factor_order_does_not_change_output() {
        let forward = vec![
            leverage(77.0, 0.3),
            stop_loss(12.5, 0.3),
            WeightedFactor::new("herding", 611.0, 0.4, FactorScale::PassThrough),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(aggregate(&forward), aggregate(&reversed));
    }

    #[test]
    fn unnormalised_weights_are_rescaled() {
        let halves = vec![leverage(200.0, 0.5), stop_loss(0.0, 0.5)];
        let doubled = vec![leverage(200.0, 1.0), stop_loss(0.0, 1.0)];
        assert_eq!(aggregate(&halves), aggregate(&doubled));
        assert_eq!(aggregate(&doubled).value(), 1000);
    }

    #[test]
    fn zero_weights_produce_zero_score() {
        let factors = vec![leverage(200.0, 0.0), stop_loss(0.0, -1.0)];
        assert_eq!(aggregate(&factors), CompositeScore::ZERO);
        assert_eq!(aggregate(&[]), CompositeScore::ZERO);
    }

    #[test]
    fn breakdown_reports_normalised_weights() {
        let factors = vec![leverage(105.0, 2.0), stop_loss(50.0, 2.0)];
        let aggregation = aggregate_with_breakdown(&factors);
        assert_eq!(aggregation.contributions.len(), 2);
        assert!(aggregation
            .contributions
            .iter()
            .all(|c| (c.weight - 0.5).abs() < 1e-12));
        assert_eq!(aggregation.contributions[0].name, "leverage");
        assert_eq!(aggregation.score.value(), 500);
    }

    #[test]
    fn validation_flags_bad_tables() {
        assert_eq!(validate_weights(&[], 0.001), Err(WeightError::Empty));
        assert!(matches!(
            validate_weights(&[0.5, f64::NAN], 0.001),
            Err(WeightError::Invalid { index: 1, .. })
        ));
        assert!(matches!(
            validate_weights(&[0.5, 0.4], 0.001),
            Err(WeightError::SumOutOfTolerance { .. })
        ));
        assert!(validate_weights(&[0.25, 0.75], 0.001).is_ok());
    }
}
