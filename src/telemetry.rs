use crate::config::TelemetryConfig;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Log target shared by the library and the binary.
const CRATE_TARGET: &str = "surveillance_analytics";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("{origin} filter '{value}' is not a valid tracing directive")]
    Filter {
        origin: &'static str,
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Expands `APP_LOG_LEVEL` into a filter directive. A bare level applies to
/// this crate only and dependencies stay at `warn`; anything with a target
/// or a comma is taken as a full directive.
pub fn directive_for(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("warn,{CRATE_TARGET}={level}")
    }
}

/// `RUST_LOG`, when set and non-empty, replaces the configured level.
pub fn log_filter(
    rust_log: Option<&str>,
    config: &TelemetryConfig,
) -> Result<EnvFilter, TelemetryError> {
    let (origin, value) = match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => ("RUST_LOG", value.to_string()),
        None => ("APP_LOG_LEVEL", directive_for(&config.log_level)),
    };

    EnvFilter::try_new(&value).map_err(|source| TelemetryError::Filter {
        origin,
        value,
        source,
    })
}

/// Installs the global subscriber. Logs go to stderr so `--json` output on
/// stdout stays parseable.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = log_filter(rust_log.as_deref(), config)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}
