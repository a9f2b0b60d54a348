mod aggregator;
mod normalizer;
pub mod profiles;
pub mod tiers;

pub use aggregator::{
    aggregate, aggregate_with_breakdown, validate_weights, Aggregation, FactorContribution,
    FactorScale, WeightError, WeightedFactor, STRICT_WEIGHT_TOLERANCE, WEIGHT_TOLERANCE,
};
pub use normalizer::{
    normalize, pass_through, CompositeScore, Direction, ScoreBounds, DEGENERATE_SCORE, SCORE_MAX,
};
pub use profiles::{
    baseline_score, group_score, pilot_score, value_breakdown, value_score, weights_of,
    FactorSpec,
};
pub use tiers::{classify, Classification, RankedEntry, TierCutPoints, ValueTier};
