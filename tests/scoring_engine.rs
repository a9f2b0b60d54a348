use chrono::NaiveDate;
use std::fs;
use surveillance_analytics::dataset::{EntityDataset, BROKERS_FILE, ENTITIES_FILE};
use surveillance_analytics::domain::EntityKind;
use surveillance_analytics::funnel::{build_funnel, FunnelCounters, FunnelSource, Timeframe};
use surveillance_analytics::policy::{simulate, PolicyLevers};
use surveillance_analytics::report::{DashboardReport, ReportOptions};
use surveillance_analytics::rhi::{compute_rhi, RhiBand, RhiMetricSet, RHI_FACTORS};
use surveillance_analytics::scoring::profiles::{
    GROUP_SCORE_FACTORS, PILOT_SCORE_FACTORS, VALUE_SCORE_FACTORS,
};
use surveillance_analytics::scoring::{
    classify, normalize, validate_weights, weights_of, CompositeScore, Direction, ScoreBounds,
    TierCutPoints, ValueTier, STRICT_WEIGHT_TOLERANCE,
};

#[test]
fn baseline_market_scores_523_in_the_medium_band() {
    let score = compute_rhi(&RhiMetricSet::baseline());
    assert_eq!(score, CompositeScore::new(523));
    assert_eq!(RhiBand::from_score(score), RhiBand::Medium);
}

#[test]
fn linear_normalization_matches_reference_value() {
    let score = normalize(100.0, ScoreBounds::new(10.0, 200.0), Direction::Ascending);
    assert!((score - 473.684).abs() < 0.01, "got {score}");
    assert_eq!(CompositeScore::from_raw(score).value(), 474);
}

#[test]
fn every_factor_table_sums_to_one() {
    for (name, weights) in [
        ("rhi", weights_of(&RHI_FACTORS)),
        ("pilot", weights_of(&PILOT_SCORE_FACTORS)),
        ("group", weights_of(&GROUP_SCORE_FACTORS)),
        ("value", weights_of(&VALUE_SCORE_FACTORS)),
    ] {
        assert!(
            validate_weights(&weights, STRICT_WEIGHT_TOLERANCE).is_ok(),
            "{name} weights do not sum to 1.0"
        );
    }
}

#[test]
fn tied_scores_rank_positionally() {
    let items = [("a", 90.0), ("b", 90.0), ("c", 70.0)];
    let classification = classify(&items, |item| item.0, |item| item.1, TierCutPoints::default());

    let ranks: Vec<usize> = classification.entries().iter().map(|entry| entry.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    assert_eq!(classification.tier_of("c"), Some(ValueTier::High));
}

#[test]
fn neutral_levers_leave_the_market_unchanged() {
    let baseline = RhiMetricSet::baseline();
    let outcome = simulate(&PolicyLevers::neutral(), &baseline);

    assert_eq!(outcome.simulated_metrics, baseline);
    assert_eq!(outcome.rhi.delta, 0);
    assert!(outcome.metrics.iter().all(|metric| metric.delta == 0.0));
}

#[test]
fn combined_intervention_lowers_harm() {
    let levers = PolicyLevers {
        max_leverage_cap: 30.0,
        stop_loss_adoption_increase: 20.0,
        herding_reduction_pct: 15.0,
        offshore_enforcement_pct: 0.0,
    };
    let outcome = simulate(&levers, &RhiMetricSet::baseline());

    assert!(outcome.rhi.delta < 0, "expected a reduction, got {}", outcome.rhi.delta);
    assert!(outcome.simulated_metrics.avg_leverage <= 30.0);
    assert!(
        outcome.simulated_metrics.median_time_to_failure
            > RhiMetricSet::baseline().median_time_to_failure
    );
}

#[test]
fn explicit_funnel_reports_conversions_and_deltas() {
    let sources = [FunnelSource::Explicit(FunnelCounters::new(1000, 400, 300, 150))];
    let stages = build_funnel(&sources, Timeframe::ThisMonth, Timeframe::LastMonth);

    let values: Vec<u64> = stages.iter().map(|stage| stage.value).collect();
    assert_eq!(values, vec![1000, 400, 300, 150]);
    assert!((stages[0].conversion_to_next - 40.0).abs() < 1e-9);
    assert!((stages[1].conversion_to_next - 75.0).abs() < 1e-9);
    assert!((stages[2].conversion_to_next - 50.0).abs() < 1e-9);
    assert_eq!(stages[3].conversion_to_next, 0.0);
    // 1000 against 920 last month
    assert!((stages[0].delta_vs_reference - 8.6957).abs() < 0.001);
}

#[test]
fn dashboard_builds_from_csv_directory() {
    let temp = tempfile::tempdir().expect("temp dir created");
    let dir = temp.path();
    fs::write(
        dir.join(ENTITIES_FILE),
        "id,name,kind,revenue,followers,win_rate_pct,max_drawdown_pct,avg_leverage,return_12m_pct,months_active,retention_30d_pct,members,high_harm_member_pct,engagement_pct,baseline_score,registered,first_copy,active,retained_30d\n\
         n-1,Atlas Signals,navigator,250000,12000,64,18,12,30,40,70,,,,,,,,\n\
         p-1,Kite Macro,pilot,90000,3000,55,25,30,12,18,52,,,,,,,,\n\
         g-1,Momentum Club,group,40000,1500,,,,14,,45,5000,30,60,,800,300,200,120\n",
    )
    .expect("entities written");
    fs::write(
        dir.join(BROKERS_FILE),
        "id,name,avg_leverage,high_harm_score_pct,median_time_to_failure,herding_score,stop_loss_usage_rate,volatility_exposure_pct,offshore_exposure_pct\n\
         b-1,Atlas Markets,52,37.5,28,580,42.7,44.4,65.4\n",
    )
    .expect("brokers written");

    let dataset = EntityDataset::from_dir(dir).expect("dataset loads");

    assert_eq!(dataset.entities.len(), 3);
    assert_eq!(dataset.of_kind(EntityKind::Group).count(), 1);

    let today = NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date");
    let summary = DashboardReport::build(&dataset, &ReportOptions::new(today));

    assert_eq!(summary.leaderboard.len(), 3);
    assert_eq!(summary.leaderboard[0].id, "n-1");
    assert_eq!(summary.brokers.len(), 1);
    assert_eq!(summary.market_rhi.rhi, CompositeScore::new(523));
    assert_eq!(summary.rhi_series.len(), 90);
    assert!(!summary.insights().recommended_actions.is_empty());
}
