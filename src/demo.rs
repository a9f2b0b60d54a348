//! Synthetic dataset used by the `demo` command and by tests.
//!
//! Every value is derived from the entity id through the seeded generator,
//! so the same build always produces the same dashboard.

use crate::dataset::EntityDataset;
use crate::domain::{BrokerRecord, EntityKind, EntityMetrics, ScoredEntity};
use crate::rhi::RhiMetricSet;
use crate::series::{seeded_unit, Seed};

const NAVIGATORS: [(&str, &str); 3] = [
    ("nav-aurora", "Aurora Signals"),
    ("nav-meridian", "Meridian Desk"),
    ("nav-harbor", "Harbor Quant"),
];

const PILOTS: [(&str, &str); 6] = [
    ("pil-falcon", "Falcon FX"),
    ("pil-kestrel", "Kestrel Macro"),
    ("pil-orbit", "Orbit Swing"),
    ("pil-sable", "Sable Scalper"),
    ("pil-tundra", "Tundra Carry"),
    ("pil-zephyr", "Zephyr Trend"),
];

const GROUPS: [(&str, &str); 3] = [
    ("grp-momentum", "Momentum Club"),
    ("grp-steady", "Steady Yield Circle"),
    ("grp-rocket", "Rocket Copiers"),
];

const BROKERS: [(&str, &str); 4] = [
    ("brk-atlas", "Atlas Markets"),
    ("brk-brightline", "Brightline Trading"),
    ("brk-coral", "Coral Prime"),
    ("brk-delta", "Delta Offshore"),
];

/// `centre ± spread`, jittered deterministically by `seed` and `slot`.
fn jitter(seed: Seed, slot: usize, centre: f64, spread: f64) -> f64 {
    let value = centre + spread * seeded_unit(seed, slot);
    (value * 10.0).round() / 10.0
}

fn trader_metrics(seed: Seed) -> EntityMetrics {
    EntityMetrics {
        revenue: jitter(seed, 0, 180_000.0, 160_000.0).max(0.0),
        followers: jitter(seed, 1, 14_000.0, 13_000.0).max(0.0) as u64,
        win_rate_pct: jitter(seed, 2, 56.0, 18.0),
        max_drawdown_pct: jitter(seed, 3, 28.0, 20.0),
        avg_leverage: jitter(seed, 4, 35.0, 30.0),
        return_12m_pct: jitter(seed, 5, 22.0, 30.0),
        months_active: jitter(seed, 6, 30.0, 24.0).round(),
        retention_30d_pct: jitter(seed, 7, 58.0, 25.0),
        ..EntityMetrics::default()
    }
}

fn group_metrics(seed: Seed) -> EntityMetrics {
    EntityMetrics {
        revenue: jitter(seed, 0, 90_000.0, 70_000.0).max(0.0),
        followers: jitter(seed, 1, 6_000.0, 5_000.0).max(0.0) as u64,
        retention_30d_pct: jitter(seed, 7, 50.0, 25.0),
        members: jitter(seed, 8, 8_000.0, 7_000.0).max(0.0) as u64,
        return_12m_pct: jitter(seed, 5, 15.0, 25.0),
        high_harm_member_pct: jitter(seed, 9, 35.0, 25.0),
        engagement_pct: jitter(seed, 10, 55.0, 30.0),
        ..EntityMetrics::default()
    }
}

fn broker_metrics(seed: Seed) -> RhiMetricSet {
    let baseline = RhiMetricSet::baseline();
    RhiMetricSet {
        avg_leverage: jitter(seed, 0, baseline.avg_leverage, 35.0),
        high_harm_score_pct: jitter(seed, 1, baseline.high_harm_score_pct, 20.0),
        median_time_to_failure: jitter(seed, 2, baseline.median_time_to_failure, 20.0),
        herding_score: jitter(seed, 3, baseline.herding_score, 250.0),
        stop_loss_usage_rate: jitter(seed, 4, baseline.stop_loss_usage_rate, 25.0),
        volatility_exposure_pct: jitter(seed, 5, baseline.volatility_exposure_pct, 25.0),
        offshore_exposure_pct: jitter(seed, 6, baseline.offshore_exposure_pct, 30.0),
    }
}

pub fn demo_dataset() -> EntityDataset {
    let traders = NAVIGATORS
        .iter()
        .map(|entry| (entry, EntityKind::Navigator))
        .chain(PILOTS.iter().map(|entry| (entry, EntityKind::Pilot)))
        .map(|((id, name), kind)| {
            ScoredEntity::new(*id, *name, kind).with_metrics(trader_metrics(Seed::from_text(id)))
        });

    let groups = GROUPS.iter().map(|(id, name)| {
        ScoredEntity::new(*id, *name, EntityKind::Group)
            .with_metrics(group_metrics(Seed::from_text(id)))
    });

    let brokers = BROKERS
        .iter()
        .map(|(id, name)| BrokerRecord {
            id: (*id).to_string(),
            name: (*name).to_string(),
            rhi: broker_metrics(Seed::from_text(id)),
        })
        .collect();

    EntityDataset::new(traders.chain(groups).collect(), brokers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_dataset_is_deterministic() {
        assert_eq!(demo_dataset(), demo_dataset());
    }

    #[test]
    fn demo_dataset_covers_every_kind() {
        let dataset = demo_dataset();
        assert_eq!(dataset.of_kind(EntityKind::Navigator).count(), 3);
        assert_eq!(dataset.of_kind(EntityKind::Pilot).count(), 6);
        assert_eq!(dataset.of_kind(EntityKind::Group).count(), 3);
        assert_eq!(dataset.brokers.len(), 4);
    }

    #[test]
    fn demo_metrics_stay_in_plausible_ranges() {
        let dataset = demo_dataset();
        for broker in &dataset.brokers {
            assert!(broker.rhi.avg_leverage > 0.0);
            assert!((0.0..=100.0).contains(&broker.rhi.stop_loss_usage_rate));
        }
        for entity in &dataset.entities {
            assert!(entity.metrics.revenue >= 0.0);
        }
    }
}
