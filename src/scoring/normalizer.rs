use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper end of every composite axis.
pub const SCORE_MAX: f64 = 1000.0;

/// Returned when a range cannot be mapped (zero or non-finite span, NaN input).
pub const DEGENERATE_SCORE: f64 = 500.0;

/// How a raw metric moves the composite score.
///
/// On harm composites `Ascending` is "higher is worse" (more leverage, more
/// harm) and `Descending` is "higher is better" (more stop-loss usage, less
/// harm). Value composites use the same two shapes on a value axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ascending => "higher is worse",
            Self::Descending => "higher is better",
        }
    }
}

/// Closed range the raw metric is expected to fall into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBounds {
    pub lo: f64,
    pub hi: f64,
}

impl ScoreBounds {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub const fn percent() -> Self {
        Self::new(0.0, 100.0)
    }

    fn ordered(self) -> (f64, f64) {
        if self.lo <= self.hi {
            (self.lo, self.hi)
        } else {
            (self.hi, self.lo)
        }
    }
}

/// Maps `value` from `bounds` onto `[0, 1000]`, inverting for `Descending`.
///
/// Values outside the bounds are clamped. A zero-width range or a NaN input
/// resolves to [`DEGENERATE_SCORE`].
pub fn normalize(value: f64, bounds: ScoreBounds, direction: Direction) -> f64 {
    let (lo, hi) = bounds.ordered();
    let span = hi - lo;
    if value.is_nan() || !span.is_finite() || span <= f64::EPSILON {
        return DEGENERATE_SCORE;
    }

    let linear = ((value - lo) / span * SCORE_MAX).clamp(0.0, SCORE_MAX);
    match direction {
        Direction::Ascending => linear,
        Direction::Descending => SCORE_MAX - linear,
    }
}

/// Clamps a score that is already expressed on the 0–1000 axis.
pub fn pass_through(value: f64) -> f64 {
    if value.is_nan() {
        return DEGENERATE_SCORE;
    }
    value.clamp(0.0, SCORE_MAX)
}

/// Integer composite score, always within `[0, 1000]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct CompositeScore(u16);

impl CompositeScore {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(1000);

    /// Rounds half away from zero and clamps; NaN becomes zero.
    pub fn from_raw(raw: f64) -> Self {
        if raw.is_nan() {
            return Self::ZERO;
        }
        Self(raw.round().clamp(0.0, SCORE_MAX) as u16)
    }

    pub fn new(value: u16) -> Self {
        Self(value.min(1000))
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl fmt::Display for CompositeScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for CompositeScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = u16::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leverage_midrange_maps_linearly() {
        let score = normalize(100.0, ScoreBounds::new(10.0, 200.0), Direction::Ascending);
        assert!((score - 473.684).abs() < 0.01, "got {score}");
        assert_eq!(CompositeScore::from_raw(score).value(), 474);
    }

    #[test]
    fn descending_inverts_the_mapping() {
        let bounds = ScoreBounds::percent();
        assert_eq!(normalize(100.0, bounds, Direction::Descending), 0.0);
        assert_eq!(normalize(0.0, bounds, Direction::Descending), 1000.0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let bounds = ScoreBounds::new(10.0, 200.0);
        assert_eq!(normalize(500.0, bounds, Direction::Ascending), 1000.0);
        assert_eq!(normalize(-5.0, bounds, Direction::Ascending), 0.0);
        assert_eq!(normalize(f64::INFINITY, bounds, Direction::Descending), 0.0);
    }

    #[test]
    fn zero_width_range_returns_midpoint() {
        let bounds = ScoreBounds::new(42.0, 42.0);
        assert_eq!(normalize(42.0, bounds, Direction::Ascending), DEGENERATE_SCORE);
        assert_eq!(normalize(7.0, bounds, Direction::Descending), DEGENERATE_SCORE);
    }

    #[test]
    fn nan_input_returns_midpoint() {
        let score = normalize(f64::NAN, ScoreBounds::percent(), Direction::Ascending);
        assert_eq!(score, DEGENERATE_SCORE);
    }

    #[test]
    fn reversed_bounds_are_reordered() {
        let forward = normalize(25.0, ScoreBounds::new(0.0, 100.0), Direction::Ascending);
        let reversed = normalize(25.0, ScoreBounds::new(100.0, 0.0), Direction::Ascending);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn composite_score_clamps_and_rejects_nan() {
        assert_eq!(CompositeScore::from_raw(1234.6), CompositeScore::MAX);
        assert_eq!(CompositeScore::from_raw(-3.0), CompositeScore::ZERO);
        assert_eq!(CompositeScore::from_raw(f64::NAN), CompositeScore::ZERO);
        assert_eq!(CompositeScore::from_raw(522.5).value(), 523);
        assert_eq!(CompositeScore::new(4000).value(), 1000);
    }
}
