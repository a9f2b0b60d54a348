use crate::render;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use surveillance_analytics::config::{AppConfig, EngineConfig, LeverMode};
use surveillance_analytics::dataset::EntityDataset;
use surveillance_analytics::demo::demo_dataset;
use surveillance_analytics::domain::EntityKind;
use surveillance_analytics::error::AppError;
use surveillance_analytics::funnel::Timeframe;
use surveillance_analytics::policy::{breakdown, simulate, PolicyLevers};
use surveillance_analytics::report::{
    funnel_view, leaderboard, DashboardReport, ReportOptions,
};
use surveillance_analytics::rhi::{
    compute_rhi, generate_series, rhi_breakdown, RhiBand, RhiMetricSet, SeriesConfig,
    MAX_SERIES_DAYS,
};
use surveillance_analytics::telemetry;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "surveillance-analytics",
    about = "Composite scoring, harm index and policy what-ifs for trading surveillance data",
    version
)]
pub(crate) struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Retail Harm Index scoring and history
    Rhi {
        #[command(subcommand)]
        command: RhiCommand,
    },
    /// Rank entities by value score and assign tiers
    Leaderboard(LeaderboardArgs),
    /// Copy-trading conversion funnel
    Funnel(FunnelArgs),
    /// Project the harm index under hypothetical regulatory levers
    Simulate(SimulateArgs),
    /// Full dashboard over the synthetic dataset
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RhiCommand {
    /// Score one metric set; unspecified metrics use the market baseline
    Score(RhiScoreArgs),
    /// Daily index history ending on a given date
    Series(RhiSeriesArgs),
}

#[derive(Args, Debug, Default, Clone)]
struct DataArgs {
    /// Directory holding entities.csv and optionally brokers.csv
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct MetricArgs {
    #[arg(long)]
    avg_leverage: Option<f64>,
    #[arg(long)]
    high_harm_score_pct: Option<f64>,
    #[arg(long)]
    median_time_to_failure: Option<f64>,
    #[arg(long)]
    herding_score: Option<f64>,
    #[arg(long)]
    stop_loss_usage_rate: Option<f64>,
    #[arg(long)]
    volatility_exposure_pct: Option<f64>,
    #[arg(long)]
    offshore_exposure_pct: Option<f64>,
}

impl MetricArgs {
    fn over(&self, base: RhiMetricSet) -> RhiMetricSet {
        RhiMetricSet {
            avg_leverage: self.avg_leverage.unwrap_or(base.avg_leverage),
            high_harm_score_pct: self.high_harm_score_pct.unwrap_or(base.high_harm_score_pct),
            median_time_to_failure: self
                .median_time_to_failure
                .unwrap_or(base.median_time_to_failure),
            herding_score: self.herding_score.unwrap_or(base.herding_score),
            stop_loss_usage_rate: self.stop_loss_usage_rate.unwrap_or(base.stop_loss_usage_rate),
            volatility_exposure_pct: self
                .volatility_exposure_pct
                .unwrap_or(base.volatility_exposure_pct),
            offshore_exposure_pct: self
                .offshore_exposure_pct
                .unwrap_or(base.offshore_exposure_pct),
        }
    }
}

#[derive(Args, Debug)]
struct RhiScoreArgs {
    #[command(flatten)]
    metrics: MetricArgs,
    /// Show each factor's contribution
    #[arg(long)]
    breakdown: bool,
}

#[derive(Args, Debug)]
struct RhiSeriesArgs {
    /// Window length in days (defaults to ANALYTICS_SERIES_DAYS)
    #[arg(long, value_parser = parse_days)]
    days: Option<usize>,
    /// Last day of the window (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,
    /// Drop the seeded noise component
    #[arg(long)]
    no_noise: bool,
}

#[derive(Args, Debug)]
struct LeaderboardArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Only rank one kind: navigator, pilot or group
    #[arg(long, value_parser = parse_kind)]
    kind: Option<EntityKind>,
    /// Show at most this many entries
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args, Debug)]
struct FunnelArgs {
    #[command(flatten)]
    data: DataArgs,
    #[arg(long, value_parser = parse_kind)]
    kind: Option<EntityKind>,
    /// this-month, last-month or last-90-days
    #[arg(long, value_parser = parse_timeframe, default_value = "this-month")]
    timeframe: Timeframe,
    /// Timeframe the deltas are measured against
    #[arg(long, value_parser = parse_timeframe, default_value = "last-month")]
    reference: Timeframe,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Maximum retail leverage (1:N), 10 to 200
    #[arg(long, default_value_t = 200.0)]
    max_leverage_cap: f64,
    /// Stop-loss adoption increase in percentage points, 0 to 50
    #[arg(long, default_value_t = 0.0)]
    stop_loss_increase: f64,
    /// Herding reduction in percent, 0 to 80
    #[arg(long, default_value_t = 0.0)]
    herding_reduction: f64,
    /// Offshore enforcement in percent, 0 to 100
    #[arg(long, default_value_t = 0.0)]
    offshore_enforcement: f64,
    /// Simulate against one broker's metrics instead of the market baseline
    #[arg(long)]
    broker: Option<String>,
    /// Also show each lever's marginal effect
    #[arg(long)]
    breakdown: bool,
}

impl SimulateArgs {
    fn levers(&self) -> PolicyLevers {
        PolicyLevers {
            max_leverage_cap: self.max_leverage_cap,
            stop_loss_adoption_increase: self.stop_loss_increase,
            herding_reduction_pct: self.herding_reduction,
            offshore_enforcement_pct: self.offshore_enforcement,
        }
    }
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    #[arg(long, value_parser = parse_timeframe, default_value = "this-month")]
    timeframe: Timeframe,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(environment = ?config.environment, "configuration loaded");

    let Cli { json, command } = cli;
    let engine = config.engine;
    match command {
        Command::Rhi {
            command: RhiCommand::Score(args),
        } => run_rhi_score(args, json),
        Command::Rhi {
            command: RhiCommand::Series(args),
        } => run_rhi_series(args, &engine, json),
        Command::Leaderboard(args) => run_leaderboard(args, &engine, json),
        Command::Funnel(args) => run_funnel(args, &engine, json),
        Command::Simulate(args) => run_simulate(args, &engine, json),
        Command::Demo(args) => run_demo(args, &engine, json),
    }
}

fn emit_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// CLI flag first, then `ANALYTICS_DATA_DIR`, then the synthetic dataset.
fn load_dataset(data: &DataArgs, engine: &EngineConfig) -> Result<EntityDataset, AppError> {
    match data.data_dir.as_ref().or(engine.data_dir.as_ref()) {
        Some(dir) => {
            let dataset = EntityDataset::from_dir(dir)?;
            info!(
                path = %dir.display(),
                entities = dataset.entities.len(),
                brokers = dataset.brokers.len(),
                "dataset loaded"
            );
            Ok(dataset)
        }
        None => {
            info!("no data directory configured, using the synthetic dataset");
            Ok(demo_dataset())
        }
    }
}

fn run_rhi_score(args: RhiScoreArgs, json: bool) -> Result<(), AppError> {
    let metrics = args.metrics.over(RhiMetricSet::baseline());
    let aggregation = rhi_breakdown(&metrics);

    if json {
        #[derive(Serialize)]
        struct RhiScoreView<'a> {
            metrics: &'a RhiMetricSet,
            rhi: u16,
            band: RhiBand,
            #[serde(skip_serializing_if = "Option::is_none")]
            factors: Option<&'a [surveillance_analytics::scoring::FactorContribution]>,
        }
        return emit_json(&RhiScoreView {
            metrics: &metrics,
            rhi: aggregation.score.value(),
            band: RhiBand::from_score(aggregation.score),
            factors: args.breakdown.then_some(aggregation.contributions.as_slice()),
        });
    }

    render::rhi_score(&aggregation, args.breakdown);
    Ok(())
}

fn run_rhi_series(args: RhiSeriesArgs, engine: &EngineConfig, json: bool) -> Result<(), AppError> {
    let end = args.end.unwrap_or_else(|| Local::now().date_naive());
    let mut config = SeriesConfig::standard(end, args.days.unwrap_or(engine.series_days));
    if args.no_noise {
        config = config.without_noise();
    }
    let series = generate_series(&config);

    if json {
        return emit_json(&series);
    }
    render::rhi_series(&series);
    Ok(())
}

fn run_leaderboard(args: LeaderboardArgs, engine: &EngineConfig, json: bool) -> Result<(), AppError> {
    let dataset = load_dataset(&args.data, engine)?;
    let population: Vec<_> = dataset
        .entities
        .iter()
        .filter(|entity| entity.kind != EntityKind::Broker)
        .filter(|entity| args.kind.map_or(true, |kind| entity.kind == kind))
        .collect();
    let mut entries = leaderboard(&population, engine.tier_cut_points);
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    if json {
        return emit_json(&entries);
    }
    render::leaderboard(&entries);
    Ok(())
}

fn run_funnel(args: FunnelArgs, engine: &EngineConfig, json: bool) -> Result<(), AppError> {
    let dataset = load_dataset(&args.data, engine)?;
    let population: Vec<_> = dataset
        .entities
        .iter()
        .filter(|entity| entity.kind != EntityKind::Broker)
        .filter(|entity| args.kind.map_or(true, |kind| entity.kind == kind))
        .collect();
    let view = funnel_view(&population, args.timeframe, args.reference);

    if json {
        return emit_json(&view);
    }
    render::funnel(&view);
    Ok(())
}

fn run_simulate(args: SimulateArgs, engine: &EngineConfig, json: bool) -> Result<(), AppError> {
    let levers = args.levers();
    if engine.lever_mode == LeverMode::Strict {
        levers.validate()?;
    }

    let baseline = match args.broker.as_deref() {
        Some(id) => {
            let dataset = load_dataset(&args.data, engine)?;
            dataset
                .brokers
                .iter()
                .find(|broker| broker.id == id)
                .map(|broker| broker.rhi)
                .ok_or_else(|| AppError::UnknownBroker(id.to_string()))?
        }
        None => RhiMetricSet::baseline(),
    };

    let outcome = simulate(&levers, &baseline);
    let contributions = args.breakdown.then(|| breakdown(&levers, &baseline));

    if json {
        #[derive(Serialize)]
        struct SimulationView<'a> {
            outcome: &'a surveillance_analytics::policy::SimulatedOutcome,
            #[serde(skip_serializing_if = "Option::is_none")]
            breakdown: Option<&'a [surveillance_analytics::policy::LeverContribution]>,
        }
        return emit_json(&SimulationView {
            outcome: &outcome,
            breakdown: contributions.as_deref(),
        });
    }

    render::simulation(&outcome, contributions.as_deref());
    Ok(())
}

fn run_demo(args: DemoArgs, engine: &EngineConfig, json: bool) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let dataset = demo_dataset();
    let options = ReportOptions {
        timeframe: args.timeframe,
        series_days: engine.series_days,
        cut_points: engine.tier_cut_points,
        ..ReportOptions::new(today)
    };
    let summary = DashboardReport::build(&dataset, &options);
    let insights = summary.insights();

    let scenario = PolicyLevers {
        max_leverage_cap: 30.0,
        stop_loss_adoption_increase: 20.0,
        herding_reduction_pct: 15.0,
        offshore_enforcement_pct: 0.0,
    };
    let market_metrics = RhiMetricSet::mean(
        &dataset
            .brokers
            .iter()
            .map(|broker| broker.rhi)
            .collect::<Vec<_>>(),
    )
    .unwrap_or_else(RhiMetricSet::baseline);
    let outcome = simulate(&scenario, &market_metrics);

    if json {
        #[derive(Serialize)]
        struct DemoView<'a> {
            summary: &'a surveillance_analytics::report::DashboardSummary,
            insights: &'a surveillance_analytics::report::DashboardInsights,
            scenario: &'a surveillance_analytics::policy::SimulatedOutcome,
        }
        return emit_json(&DemoView {
            summary: &summary,
            insights: &insights,
            scenario: &outcome,
        });
    }

    println!("Surveillance analytics demo ({today})");
    println!(
        "Market harm index: {} ({}) from {} brokers; baseline reference {}",
        summary.market_rhi.rhi,
        summary.market_rhi.band_label,
        summary.market_rhi.from_brokers,
        compute_rhi(&RhiMetricSet::baseline())
    );
    render::leaderboard(&summary.leaderboard);
    render::funnel(&summary.funnel);
    render::brokers(&summary.brokers);
    render::rhi_series(&summary.rhi_series);
    render::simulation(&outcome, None);
    render::insights(&insights);
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_days(raw: &str) -> Result<usize, String> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|days| *days <= MAX_SERIES_DAYS)
        .ok_or_else(|| format!("expected a day count from 0 to {MAX_SERIES_DAYS}, got '{raw}'"))
}

fn parse_kind(raw: &str) -> Result<EntityKind, String> {
    EntityKind::parse(raw).ok_or_else(|| format!("unknown entity kind '{raw}'"))
}

fn parse_timeframe(raw: &str) -> Result<Timeframe, String> {
    Timeframe::parse(raw).ok_or_else(|| {
        format!("unknown timeframe '{raw}', expected this-month, last-month or last-90-days")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_simulate_levers_and_global_json() {
        let cli = Cli::try_parse_from([
            "surveillance-analytics",
            "simulate",
            "--max-leverage-cap",
            "30",
            "--stop-loss-increase",
            "20",
            "--herding-reduction",
            "15",
            "--breakdown",
            "--json",
        ])
        .expect("valid arguments");

        assert!(cli.json);
        match cli.command {
            Command::Simulate(args) => {
                let levers = args.levers();
                assert_eq!(levers.max_leverage_cap, 30.0);
                assert_eq!(levers.stop_loss_adoption_increase, 20.0);
                assert_eq!(levers.herding_reduction_pct, 15.0);
                assert_eq!(levers.offshore_enforcement_pct, 0.0);
                assert!(args.breakdown);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn series_window_is_bounded() {
        let parse = |days: &str| {
            Cli::try_parse_from(["surveillance-analytics", "rhi", "series", "--days", days])
        };

        assert!(parse("3650").is_ok());
        assert!(parse("3651").is_err());
        assert!(parse("18446744073709551615").is_err());
    }

    #[test]
    fn rhi_score_overrides_only_given_metrics() {
        let cli = Cli::try_parse_from([
            "surveillance-analytics",
            "rhi",
            "score",
            "--avg-leverage",
            "30",
        ])
        .expect("valid arguments");

        match cli.command {
            Command::Rhi {
                command: RhiCommand::Score(args),
            } => {
                let metrics = args.metrics.over(RhiMetricSet::baseline());
                assert_eq!(metrics.avg_leverage, 30.0);
                assert_eq!(
                    metrics.herding_score,
                    RhiMetricSet::baseline().herding_score
                );
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_timeframe() {
        let result = Cli::try_parse_from([
            "surveillance-analytics",
            "funnel",
            "--timeframe",
            "fortnight",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_dates_and_kinds() {
        assert_eq!(
            parse_date("2024-06-30"),
            Ok(NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date"))
        );
        assert!(parse_date("30/06/2024").is_err());
        assert_eq!(parse_kind("Pilots"), Ok(EntityKind::Pilot));
        assert!(parse_kind("whale").is_err());
    }
}
