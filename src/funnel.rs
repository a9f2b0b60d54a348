use serde::{Deserialize, Serialize};

/// Share of registered users that place a first copy when counters are inferred.
pub const INFERRED_FIRST_COPY_RATIO: f64 = 0.68;
/// Share of first copiers still active.
pub const INFERRED_ACTIVE_RATIO: f64 = 0.78;
/// Share of active copiers retained after 30 days.
pub const INFERRED_RETAINED_RATIO: f64 = 0.75;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelCounters {
    pub registered: u64,
    pub first_copy: u64,
    pub active: u64,
    pub retained_30d: u64,
}

impl FunnelCounters {
    pub const fn new(registered: u64, first_copy: u64, active: u64, retained_30d: u64) -> Self {
        Self {
            registered,
            first_copy,
            active,
            retained_30d,
        }
    }

    fn stage(&self, stage: FunnelStageKind) -> u64 {
        match stage {
            FunnelStageKind::Registered => self.registered,
            FunnelStageKind::FirstCopy => self.first_copy,
            FunnelStageKind::ActiveCopier => self.active,
            FunnelStageKind::Retained30d => self.retained_30d,
        }
    }

    fn saturating_add(self, other: Self) -> Self {
        Self {
            registered: self.registered.saturating_add(other.registered),
            first_copy: self.first_copy.saturating_add(other.first_copy),
            active: self.active.saturating_add(other.active),
            retained_30d: self.retained_30d.saturating_add(other.retained_30d),
        }
    }
}

/// Where an entity's funnel counters come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelSource {
    Explicit(FunnelCounters),
    InferredFromFollowers(u64),
}

impl FunnelSource {
    pub fn resolve(&self) -> FunnelCounters {
        match *self {
            FunnelSource::Explicit(counters) => counters,
            FunnelSource::InferredFromFollowers(followers) => {
                let first_copy = scale_count(followers, INFERRED_FIRST_COPY_RATIO);
                let active = scale_count(first_copy, INFERRED_ACTIVE_RATIO);
                let retained_30d = scale_count(active, INFERRED_RETAINED_RATIO);
                FunnelCounters {
                    registered: followers,
                    first_copy,
                    active,
                    retained_30d,
                }
            }
        }
    }
}

fn scale_count(value: u64, factor: f64) -> u64 {
    (value as f64 * factor).round().max(0.0) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStageKind {
    Registered,
    FirstCopy,
    ActiveCopier,
    Retained30d,
}

impl FunnelStageKind {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Registered,
            Self::FirstCopy,
            Self::ActiveCopier,
            Self::Retained30d,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Registered => "Registered",
            Self::FirstCopy => "First Copy",
            Self::ActiveCopier => "Active Copier",
            Self::Retained30d => "Retained 30d",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    ThisMonth,
    LastMonth,
    Last90Days,
}

impl Timeframe {
    pub const fn scale(self) -> f64 {
        match self {
            Self::ThisMonth => 1.0,
            Self::LastMonth => 0.92,
            Self::Last90Days => 1.12,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ThisMonth => "This month",
            Self::LastMonth => "Last month",
            Self::Last90Days => "Last 90 days",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "this-month" | "month" => Some(Self::ThisMonth),
            "last-month" => Some(Self::LastMonth),
            "last-90-days" | "90d" | "quarter" => Some(Self::Last90Days),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStage {
    pub stage: FunnelStageKind,
    pub label: &'static str,
    pub value: u64,
    /// Percentage of this stage reaching the next one; 0 for the last stage.
    pub conversion_to_next: f64,
    /// Percentage change against the same stage in the reference timeframe.
    pub delta_vs_reference: f64,
}

/// Sums resolved counters across every source.
pub fn total_counters(sources: &[FunnelSource]) -> FunnelCounters {
    sources
        .iter()
        .map(FunnelSource::resolve)
        .fold(FunnelCounters::default(), FunnelCounters::saturating_add)
}

fn scaled(value: u64, timeframe: Timeframe) -> u64 {
    scale_count(value, timeframe.scale())
}

/// Percentage of `numerator` over `denominator`, with the denominator floored at 1.
pub fn rate_pct(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator.max(1.0) * 100.0
}

/// Four-stage funnel for `timeframe`, with deltas against `reference`.
pub fn build_funnel(
    sources: &[FunnelSource],
    timeframe: Timeframe,
    reference: Timeframe,
) -> Vec<FunnelStage> {
    let totals = total_counters(sources);
    let stages = FunnelStageKind::ordered();

    let values: Vec<u64> = stages
        .iter()
        .map(|stage| scaled(totals.stage(*stage), timeframe))
        .collect();

    stages
        .iter()
        .enumerate()
        .map(|(index, stage)| {
            let value = values[index];
            let conversion_to_next = values
                .get(index + 1)
                .map(|next| rate_pct(*next as f64, value as f64))
                .unwrap_or(0.0);
            let reference_value = scaled(totals.stage(*stage), reference);
            let delta_vs_reference =
                rate_pct(value as f64 - reference_value as f64, reference_value as f64);

            FunnelStage {
                stage: *stage,
                label: stage.label(),
                value,
                conversion_to_next,
                delta_vs_reference,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inferred_counters_follow_fixed_ratios() {
        let counters = FunnelSource::InferredFromFollowers(1000).resolve();
        assert_eq!(counters, FunnelCounters::new(1000, 680, 530, 398));
    }

    #[test]
    fn sums_explicit_and_inferred_sources() {
        let sources = [
            FunnelSource::Explicit(FunnelCounters::new(200, 100, 50, 25)),
            FunnelSource::InferredFromFollowers(1000),
        ];
        assert_eq!(
            total_counters(&sources),
            FunnelCounters::new(1200, 780, 580, 423)
        );
    }

    #[test]
    fn stages_are_ordered_with_terminal_conversion_zero() {
        let sources = [FunnelSource::Explicit(FunnelCounters::new(1000, 500, 250, 100))];
        let funnel = build_funnel(&sources, Timeframe::ThisMonth, Timeframe::ThisMonth);
        let labels: Vec<&str> = funnel.iter().map(|stage| stage.label).collect();
        assert_eq!(
            labels,
            ["Registered", "First Copy", "Active Copier", "Retained 30d"]
        );
        assert_eq!(funnel[0].conversion_to_next, 50.0);
        assert_eq!(funnel[1].conversion_to_next, 50.0);
        assert_eq!(funnel[2].conversion_to_next, 40.0);
        assert_eq!(funnel[3].conversion_to_next, 0.0);
        assert!(funnel.iter().all(|stage| stage.delta_vs_reference == 0.0));
    }

    #[test]
    fn timeframe_scaling_and_delta() {
        let sources = [FunnelSource::Explicit(FunnelCounters::new(1000, 500, 250, 100))];
        let funnel = build_funnel(&sources, Timeframe::Last90Days, Timeframe::ThisMonth);
        assert_eq!(funnel[0].value, 1120);
        assert!((funnel[0].delta_vs_reference - 12.0).abs() < 1e-9);

        let previous = build_funnel(&sources, Timeframe::LastMonth, Timeframe::ThisMonth);
        assert_eq!(previous[0].value, 920);
        assert!((previous[0].delta_vs_reference + 8.0).abs() < 1e-9);
    }

    #[test]
    fn empty_stages_never_produce_nan() {
        let funnel = build_funnel(&[], Timeframe::ThisMonth, Timeframe::LastMonth);
        assert!(funnel.iter().all(|stage| stage.value == 0));
        assert!(funnel
            .iter()
            .all(|stage| stage.conversion_to_next.is_finite() && stage.delta_vs_reference.is_finite()));
    }

    #[test]
    fn timeframe_parsing() {
        assert_eq!(Timeframe::parse("last_90_days"), Some(Timeframe::Last90Days));
        assert_eq!(Timeframe::parse("Last Month"), Some(Timeframe::LastMonth));
        assert_eq!(Timeframe::parse("yesterday"), None);
    }
}
