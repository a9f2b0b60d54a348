use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTier {
    High,
    Medium,
    Low,
}

impl ValueTier {
    pub const fn ordered() -> [Self; 3] {
        [Self::High, Self::Medium, Self::Low]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Rank-based tier boundaries (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCutPoints {
    pub high_max_rank: usize,
    pub medium_max_rank: usize,
}

impl Default for TierCutPoints {
    fn default() -> Self {
        Self {
            high_max_rank: 3,
            medium_max_rank: 10,
        }
    }
}

impl TierCutPoints {
    pub fn tier_for_rank(&self, rank: usize) -> ValueTier {
        if rank <= self.high_max_rank {
            ValueTier::High
        } else if rank <= self.medium_max_rank.max(self.high_max_rank) {
            ValueTier::Medium
        } else {
            ValueTier::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub id: String,
    pub score: f64,
    pub rank: usize,
}

/// Result of ranking a population. Tiers are derived from ranks on lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    entries: Vec<RankedEntry>,
    positions: HashMap<String, usize>,
    cut_points: TierCutPoints,
}

impl Classification {
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cut_points(&self) -> TierCutPoints {
        self.cut_points
    }

    pub fn rank_of(&self, id: &str) -> Option<usize> {
        self.positions.get(id).map(|index| self.entries[*index].rank)
    }

    pub fn score_of(&self, id: &str) -> Option<f64> {
        self.positions.get(id).map(|index| self.entries[*index].score)
    }

    pub fn tier_of(&self, id: &str) -> Option<ValueTier> {
        self.rank_of(id)
            .map(|rank| self.cut_points.tier_for_rank(rank))
    }

    pub fn tier_members(&self, tier: ValueTier) -> impl Iterator<Item = &RankedEntry> + '_ {
        let cut_points = self.cut_points;
        self.entries
            .iter()
            .filter(move |entry| cut_points.tier_for_rank(entry.rank) == tier)
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    let key = |score: f64| if score.is_nan() { f64::NEG_INFINITY } else { score };
    key(b).total_cmp(&key(a))
}

/// Ranks `entities` by `score_fn`, highest first.
///
/// Ranks are positional: equal scores never share a rank, the lexically
/// smaller id goes first. Duplicate ids keep their first occurrence.
pub fn classify<T, I, S>(
    entities: &[T],
    id_fn: I,
    score_fn: S,
    cut_points: TierCutPoints,
) -> Classification
where
    I: Fn(&T) -> &str,
    S: Fn(&T) -> f64,
{
    if entities.is_empty() {
        warn!("ranking requested for an empty population");
        return Classification {
            cut_points,
            ..Classification::default()
        };
    }

    let mut scored: Vec<(&str, f64)> = entities
        .iter()
        .map(|entity| (id_fn(entity), score_fn(entity)))
        .collect();
    scored.sort_by(|a, b| descending(a.1, b.1).then_with(|| a.0.cmp(b.0)));

    let mut entries = Vec::with_capacity(scored.len());
    let mut positions = HashMap::with_capacity(scored.len());
    for (id, score) in scored {
        if positions.contains_key(id) {
            warn!(id, "duplicate id ignored while ranking");
            continue;
        }
        positions.insert(id.to_string(), entries.len());
        entries.push(RankedEntry {
            id: id.to_string(),
            score,
            rank: entries.len() + 1,
        });
    }

    Classification {
        entries,
        positions,
        cut_points,
    }
}
