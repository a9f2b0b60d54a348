use crate::scoring::CompositeScore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RhiBand {
    Low,
    Medium,
    High,
    Critical,
}

impl RhiBand {
    pub fn from_score(score: CompositeScore) -> Self {
        match score.value() {
            0..=299 => Self::Low,
            300..=599 => Self::Medium,
            600..=799 => Self::High,
            _ => Self::Critical,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_exclusive_upper_bounds() {
        let band = |value| RhiBand::from_score(CompositeScore::new(value));
        assert_eq!(band(0), RhiBand::Low);
        assert_eq!(band(299), RhiBand::Low);
        assert_eq!(band(300), RhiBand::Medium);
        assert_eq!(band(599), RhiBand::Medium);
        assert_eq!(band(600), RhiBand::High);
        assert_eq!(band(799), RhiBand::High);
        assert_eq!(band(800), RhiBand::Critical);
        assert_eq!(band(1000), RhiBand::Critical);
    }
}
