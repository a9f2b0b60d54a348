//! Reproducible "random looking" series for sparklines and chart noise.
//!
//! Everything here is a pure function of the seed and the index; there is no
//! random state, so a given entity renders the same trend on every call.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TREND_LENGTH: usize = 7;

const TREND_AMPLITUDE: f64 = 0.08;
const TREND_MAX_SLOPE: f64 = 0.02;

/// Numeric seed derived from an entity id or an explicit number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(u64);

impl Seed {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// Sum of character codes, each weighted by its 1-based position.
    pub fn from_text(text: &str) -> Self {
        let value = text
            .chars()
            .enumerate()
            .fold(0u64, |acc, (index, ch)| {
                acc.wrapping_add(u64::from(ch).wrapping_mul(index as u64 + 1))
            });
        Self(value)
    }

    fn phase(self) -> f64 {
        (self.0 % 100_000) as f64
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

impl From<&String> for Seed {
    fn from(value: &String) -> Self {
        Self::from_text(value)
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Trend around `base`, floored at zero for counts, scores and currency.
pub fn seeded_trend(seed: impl Into<Seed>, base: f64, length: usize) -> Vec<f64> {
    seeded_trend_signed(seed, base, length)
        .into_iter()
        .map(|value| value.max(0.0))
        .collect()
}

/// `base + A·sin(seed + i) + B·(i − center)` without the zero floor.
pub fn seeded_trend_signed(seed: impl Into<Seed>, base: f64, length: usize) -> Vec<f64> {
    let seed = seed.into();
    if length == 0 || !base.is_finite() {
        return Vec::new();
    }

    let magnitude = base.abs();
    let amplitude = TREND_AMPLITUDE * magnitude;
    // Slope in [-1, 1] of the maximum, picked from the seed.
    let tilt = ((seed.value() % 7) as f64 - 3.0) / 3.0;
    let slope = TREND_MAX_SLOPE * magnitude * tilt;
    let center = (length as f64 - 1.0) / 2.0;

    (0..length)
        .map(|index| {
            let i = index as f64;
            round2(base + amplitude * (seed.phase() + i).sin() + slope * (i - center))
        })
        .collect()
}

/// Deterministic noise in `[-1, 1]` for `index` under `seed`.
pub fn seeded_unit(seed: Seed, index: usize) -> f64 {
    let x = (seed.phase() * 12.9898 + index as f64 * 78.233).sin() * 43_758.545_3;
    let fract = x - x.floor();
    fract * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_arguments_yield_identical_trends() {
        let first = seeded_trend("pilot-042", 640.0, DEFAULT_TREND_LENGTH);
        let second = seeded_trend("pilot-042", 640.0, DEFAULT_TREND_LENGTH);
        assert_eq!(first, second);
        assert_eq!(first.len(), DEFAULT_TREND_LENGTH);
    }

    #[test]
    fn different_ids_diverge() {
        let first = seeded_trend("pilot-042", 640.0, 7);
        let second = seeded_trend("pilot-043", 640.0, 7);
        assert_ne!(first, second);
    }

    #[test]
    fn text_seed_weights_positions() {
        assert_eq!(Seed::from_text("ab").value(), 97 + 98 * 2);
        assert_ne!(Seed::from_text("ab"), Seed::from_text("ba"));
    }

    #[test]
    fn trend_stays_near_base() {
        let trend = seeded_trend(17u64, 1000.0, 7);
        assert!(trend
            .iter()
            .all(|value| (*value - 1000.0).abs() <= 80.0 + 60.0 + 0.01));
    }

    #[test]
    fn floor_applies_only_to_unsigned_variant() {
        let floored = seeded_trend(3u64, 0.0, 5);
        assert!(floored.iter().all(|value| *value >= 0.0));

        let signed = seeded_trend_signed(5u64, -200.0, 5);
        assert!(signed.iter().any(|value| *value < 0.0));
        let floored = seeded_trend(5u64, -200.0, 5);
        assert!(floored.iter().all(|value| *value == 0.0));
    }

    #[test]
    fn empty_length_yields_empty_series() {
        assert!(seeded_trend("x", 10.0, 0).is_empty());
    }

    #[test]
    fn unit_noise_is_bounded_and_stable() {
        let seed = Seed::new(99);
        for index in 0..200 {
            let value = seeded_unit(seed, index);
            assert!((-1.0..=1.0).contains(&value));
            assert_eq!(value, seeded_unit(seed, index));
        }
    }
}
