use surveillance_analytics::policy::{LeverContribution, SimulatedOutcome};
use surveillance_analytics::report::{
    BrokerHarmEntry, DashboardInsights, FunnelView, LeaderboardEntry,
};
use surveillance_analytics::rhi::{RhiBand, RhiPoint};
use surveillance_analytics::scoring::Aggregation;

/// Days between printed points in a text series.
const SERIES_STRIDE: usize = 7;

pub(crate) fn rhi_score(aggregation: &Aggregation, with_factors: bool) {
    let band = RhiBand::from_score(aggregation.score);
    println!("Retail Harm Index: {} ({})", aggregation.score, band.label());

    if with_factors {
        println!("\nFactor contributions");
        for factor in &aggregation.contributions {
            println!(
                "- {}: sub-score {:.1} x weight {:.2} = {:.1}",
                factor.name, factor.sub_score, factor.weight, factor.contribution
            );
        }
    }
}

pub(crate) fn rhi_series(series: &[RhiPoint]) {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        println!("\nHarm index history: no data");
        return;
    };

    println!(
        "\nHarm index history ({} -> {}, {} days)",
        first.date,
        last.date,
        series.len()
    );
    let peak = series.iter().max_by_key(|point| point.rhi);
    for (index, point) in series.iter().enumerate() {
        if index % SERIES_STRIDE == 0 || index + 1 == series.len() {
            println!("- {}: {} ({})", point.date, point.rhi, point.band.label());
        }
    }
    if let Some(peak) = peak {
        println!("Peak: {} on {} ({})", peak.rhi, peak.date, peak.band.label());
    }
}

pub(crate) fn leaderboard(entries: &[LeaderboardEntry]) {
    if entries.is_empty() {
        println!("\nLeaderboard: no entities");
        return;
    }

    println!("\nLeaderboard");
    for entry in entries {
        let trend: Vec<String> = entry.trend.iter().map(|value| format!("{value:.0}")).collect();
        println!(
            "{:>3}. {} ({}) value {} | baseline {} | {} tier | trend {}",
            entry.rank,
            entry.name,
            entry.kind_label,
            entry.value_score,
            entry.baseline_score,
            entry.tier_label,
            trend.join(" ")
        );
    }
}

pub(crate) fn funnel(view: &FunnelView) {
    println!(
        "\nConversion funnel ({} vs {})",
        view.timeframe_label, view.reference_label
    );
    for stage in &view.stages {
        println!(
            "- {}: {} | {:.1}% to next | {:+.1}% vs reference",
            stage.label, stage.value, stage.conversion_to_next, stage.delta_vs_reference
        );
    }
}

pub(crate) fn brokers(entries: &[BrokerHarmEntry]) {
    if entries.is_empty() {
        println!("\nBroker harm: no brokers supplied");
        return;
    }

    println!("\nBroker harm ranking");
    for entry in entries {
        println!(
            "{:>3}. {} RHI {} ({})",
            entry.rank, entry.name, entry.rhi, entry.band_label
        );
    }
}

pub(crate) fn simulation(outcome: &SimulatedOutcome, contributions: Option<&[LeverContribution]>) {
    println!("\nPolicy simulation");
    println!(
        "Levers: cap 1:{:.0}, stop-loss +{:.1}pp, herding -{:.0}%, offshore enforcement {:.0}%",
        outcome.levers.max_leverage_cap,
        outcome.levers.stop_loss_adoption_increase,
        outcome.levers.herding_reduction_pct,
        outcome.levers.offshore_enforcement_pct
    );
    println!(
        "RHI {} ({}) -> {} ({}), change {:+}",
        outcome.rhi.baseline,
        outcome.rhi.baseline_band.label(),
        outcome.rhi.simulated,
        outcome.rhi.simulated_band.label(),
        outcome.rhi.delta
    );
    for metric in &outcome.metrics {
        println!(
            "- {}: {:.1} -> {:.1} ({:+.1})",
            metric.label, metric.baseline, metric.simulated, metric.delta
        );
    }

    if let Some(contributions) = contributions {
        println!("\nLever by lever (others neutral)");
        for contribution in contributions {
            println!(
                "- {}: RHI {:+}, time to failure {:+.1} days",
                contribution.description, contribution.rhi_impact, contribution.ttf_impact
            );
        }
    }
}

pub(crate) fn insights(insights: &DashboardInsights) {
    if !insights.observations.is_empty() {
        println!("\nObservations");
        for line in &insights.observations {
            println!("- {line}");
        }
    }
    println!("\nRecommended actions");
    for line in &insights.recommended_actions {
        println!("- {line}");
    }
}
