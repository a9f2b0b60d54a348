use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeverKind {
    MaxLeverageCap,
    StopLossAdoptionIncrease,
    HerdingReductionPct,
    OffshoreEnforcementPct,
}

impl LeverKind {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::MaxLeverageCap,
            Self::StopLossAdoptionIncrease,
            Self::HerdingReductionPct,
            Self::OffshoreEnforcementPct,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::MaxLeverageCap => "Max leverage cap",
            Self::StopLossAdoptionIncrease => "Stop-loss adoption increase",
            Self::HerdingReductionPct => "Herding reduction",
            Self::OffshoreEnforcementPct => "Offshore enforcement",
        }
    }

    /// Declared `[min, max]` of the lever.
    pub const fn bounds(self) -> (f64, f64) {
        match self {
            Self::MaxLeverageCap => (10.0, 200.0),
            Self::StopLossAdoptionIncrease => (0.0, 50.0),
            Self::HerdingReductionPct => (0.0, 80.0),
            Self::OffshoreEnforcementPct => (0.0, 100.0),
        }
    }

    /// Value at which the lever has no effect.
    pub const fn neutral(self) -> f64 {
        match self {
            Self::MaxLeverageCap => 200.0,
            Self::StopLossAdoptionIncrease
            | Self::HerdingReductionPct
            | Self::OffshoreEnforcementPct => 0.0,
        }
    }

    pub fn describe(self, value: f64) -> String {
        match self {
            Self::MaxLeverageCap => format!("Cap retail leverage at 1:{value:.0}"),
            Self::StopLossAdoptionIncrease => {
                format!("Raise stop-loss usage by {value:.1} percentage points")
            }
            Self::HerdingReductionPct => format!("Cut copy-trading herding by {value:.0}%"),
            Self::OffshoreEnforcementPct => {
                format!("Enforce against {value:.0}% of offshore solicitation")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LeverError {
    #[error("{lever} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        lever: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{lever} is not a finite number")]
    NonFinite { lever: &'static str },
}

/// Hypothetical regulatory interventions fed to the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyLevers {
    pub max_leverage_cap: f64,
    pub stop_loss_adoption_increase: f64,
    pub herding_reduction_pct: f64,
    pub offshore_enforcement_pct: f64,
}

impl Default for PolicyLevers {
    fn default() -> Self {
        Self::neutral()
    }
}

impl PolicyLevers {
    pub const fn neutral() -> Self {
        Self {
            max_leverage_cap: LeverKind::MaxLeverageCap.neutral(),
            stop_loss_adoption_increase: LeverKind::StopLossAdoptionIncrease.neutral(),
            herding_reduction_pct: LeverKind::HerdingReductionPct.neutral(),
            offshore_enforcement_pct: LeverKind::OffshoreEnforcementPct.neutral(),
        }
    }

    pub fn get(&self, kind: LeverKind) -> f64 {
        match kind {
            LeverKind::MaxLeverageCap => self.max_leverage_cap,
            LeverKind::StopLossAdoptionIncrease => self.stop_loss_adoption_increase,
            LeverKind::HerdingReductionPct => self.herding_reduction_pct,
            LeverKind::OffshoreEnforcementPct => self.offshore_enforcement_pct,
        }
    }

    pub fn with(mut self, kind: LeverKind, value: f64) -> Self {
        match kind {
            LeverKind::MaxLeverageCap => self.max_leverage_cap = value,
            LeverKind::StopLossAdoptionIncrease => self.stop_loss_adoption_increase = value,
            LeverKind::HerdingReductionPct => self.herding_reduction_pct = value,
            LeverKind::OffshoreEnforcementPct => self.offshore_enforcement_pct = value,
        }
        self
    }

    /// Only `kind` set from `self`, every other lever neutral.
    pub fn isolate(&self, kind: LeverKind) -> Self {
        Self::neutral().with(kind, self.get(kind))
    }

    pub fn is_neutral(&self) -> bool {
        LeverKind::ordered()
            .into_iter()
            .all(|kind| self.get(kind) == kind.neutral())
    }

    /// Rejects any lever outside its declared bounds.
    pub fn validate(&self) -> Result<(), LeverError> {
        for kind in LeverKind::ordered() {
            let value = self.get(kind);
            let (min, max) = kind.bounds();
            if !value.is_finite() {
                return Err(LeverError::NonFinite {
                    lever: kind.label(),
                });
            }
            if value < min || value > max {
                return Err(LeverError::OutOfRange {
                    lever: kind.label(),
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Pulls every lever into its bounds; non-finite values fall back to neutral.
    pub fn clamped(&self) -> Self {
        LeverKind::ordered()
            .into_iter()
            .fold(*self, |levers, kind| {
                let value = self.get(kind);
                let (min, max) = kind.bounds();
                let bounded = if value.is_finite() {
                    value.clamp(min, max)
                } else {
                    kind.neutral()
                };
                if bounded != value {
                    warn!(lever = kind.label(), value, bounded, "policy lever clamped");
                }
                levers.with(kind, bounded)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_levers_validate() {
        let levers = PolicyLevers::neutral();
        assert!(levers.is_neutral());
        assert!(levers.validate().is_ok());
    }

    #[test]
    fn out_of_range_is_rejected_or_clamped() {
        let levers = PolicyLevers::neutral().with(LeverKind::HerdingReductionPct, 95.0);
        assert!(matches!(
            levers.validate(),
            Err(LeverError::OutOfRange { max, .. }) if max == 80.0
        ));
        assert_eq!(levers.clamped().herding_reduction_pct, 80.0);
    }

    #[test]
    fn non_finite_values_fall_back_to_neutral() {
        let levers = PolicyLevers::neutral().with(LeverKind::MaxLeverageCap, f64::NAN);
        assert!(matches!(levers.validate(), Err(LeverError::NonFinite { .. })));
        assert_eq!(levers.clamped().max_leverage_cap, 200.0);
    }

    #[test]
    fn isolate_keeps_one_lever() {
        let levers = PolicyLevers {
            max_leverage_cap: 30.0,
            stop_loss_adoption_increase: 20.0,
            herding_reduction_pct: 10.0,
            offshore_enforcement_pct: 50.0,
        };
        let isolated = levers.isolate(LeverKind::StopLossAdoptionIncrease);
        assert_eq!(isolated.stop_loss_adoption_increase, 20.0);
        assert_eq!(isolated.max_leverage_cap, 200.0);
        assert_eq!(isolated.herding_reduction_pct, 0.0);
    }
}
