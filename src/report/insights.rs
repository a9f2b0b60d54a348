use super::views::{DashboardInsights, DashboardSummary};
use crate::funnel::FunnelStageKind;
use crate::rhi::RhiBand;
use crate::scoring::ValueTier;

/// Conversion below this share of the previous stage is called out.
const WEAK_CONVERSION_PCT: f64 = 50.0;
/// Share of total value held by the high tier that counts as concentrated.
const CONCENTRATION_PCT: f64 = 50.0;
/// Series movement (index points) worth reporting.
const SERIES_MOVE_POINTS: i32 = 25;

pub(crate) fn generate_insights(summary: &DashboardSummary) -> DashboardInsights {
    let mut observations = Vec::new();
    let mut actions = Vec::new();

    let market = &summary.market_rhi;
    if market.band >= RhiBand::High {
        observations.push(format!(
            "Market harm index at {} ({}) across {} broker(s)",
            market.rhi, market.band_label, market.from_brokers
        ));
        actions.push("Escalate the market to supervisory review and model a leverage cap".to_string());
    }

    if let Some(driver) = market
        .factors
        .iter()
        .max_by(|a, b| a.contribution.total_cmp(&b.contribution))
    {
        observations.push(format!(
            "Largest harm driver: {} ({:.0} of {} points)",
            driver.name, driver.contribution, market.rhi
        ));
    }

    let critical: Vec<&str> = summary
        .brokers
        .iter()
        .filter(|broker| broker.band == RhiBand::Critical)
        .take(3)
        .map(|broker| broker.name.as_str())
        .collect();
    if !critical.is_empty() {
        observations.push(format!("Critical harm brokers: {}", critical.join(", ")));
        actions.push("Request client-outcome data from critical harm brokers".to_string());
    }

    let weakest = summary
        .funnel
        .stages
        .iter()
        .filter(|stage| stage.stage != FunnelStageKind::Retained30d)
        .min_by(|a, b| a.conversion_to_next.total_cmp(&b.conversion_to_next));
    if let Some(stage) = weakest {
        if stage.value > 0 && stage.conversion_to_next < WEAK_CONVERSION_PCT {
            observations.push(format!(
                "Weak conversion after {}: {:.1}% move on",
                stage.label, stage.conversion_to_next
            ));
            actions.push(format!("Review onboarding past the {} stage", stage.label));
        }
    }

    let total_value: f64 = summary
        .leaderboard
        .iter()
        .map(|entry| entry.value_score.as_f64())
        .sum();
    let high_value: f64 = summary
        .leaderboard
        .iter()
        .filter(|entry| entry.tier == ValueTier::High)
        .map(|entry| entry.value_score.as_f64())
        .sum();
    if total_value > 0.0 && summary.leaderboard.len() > 3 {
        let share = high_value / total_value * 100.0;
        if share >= CONCENTRATION_PCT {
            observations.push(format!(
                "High tier holds {share:.0}% of total value score"
            ));
            actions.push("Monitor concentration risk in top-tier entities".to_string());
        }
    }

    if let (Some(first), Some(last)) = (summary.rhi_series.first(), summary.rhi_series.last()) {
        let moved = i32::from(last.rhi.value()) - i32::from(first.rhi.value());
        if moved >= SERIES_MOVE_POINTS {
            observations.push(format!(
                "Harm index rose {moved} points over {} days",
                summary.rhi_series.len()
            ));
        } else if moved <= -SERIES_MOVE_POINTS {
            observations.push(format!(
                "Harm index fell {} points over {} days",
                -moved,
                summary.rhi_series.len()
            ));
        }
    }

    if actions.is_empty() {
        actions.push("No elevated harm signals; keep standard monitoring cadence".to_string());
    }

    DashboardInsights {
        observations,
        recommended_actions: actions,
    }
}
