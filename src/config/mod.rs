use crate::rhi::MAX_SERIES_DAYS;
use crate::scoring::TierCutPoints;
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// How out-of-range policy levers are treated at the command-line boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeverMode {
    /// Pull levers into their declared bounds and continue.
    Clamp,
    /// Refuse to simulate with an out-of-range lever.
    Strict,
}

impl LeverMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "clamp" => Some(Self::Clamp),
            "strict" | "reject" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub engine: EngineConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let data_dir = env::var("ANALYTICS_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let series_days = env::var("ANALYTICS_SERIES_DAYS")
            .unwrap_or_else(|_| "90".to_string())
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|days| *days <= MAX_SERIES_DAYS)
            .ok_or(ConfigError::InvalidSeriesDays)?;

        let high_max_rank = parse_rank("ANALYTICS_TIER_HIGH_RANK", 3)?;
        let medium_max_rank = parse_rank("ANALYTICS_TIER_MEDIUM_RANK", 10)?;
        if medium_max_rank < high_max_rank {
            return Err(ConfigError::TierOrder {
                high: high_max_rank,
                medium: medium_max_rank,
            });
        }

        let lever_mode_raw = env::var("ANALYTICS_LEVER_MODE").unwrap_or_else(|_| "clamp".to_string());
        let lever_mode = LeverMode::parse(&lever_mode_raw)
            .ok_or(ConfigError::InvalidLeverMode(lever_mode_raw))?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            engine: EngineConfig {
                data_dir,
                series_days,
                tier_cut_points: TierCutPoints {
                    high_max_rank,
                    medium_max_rank,
                },
                lever_mode,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_rank(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|rank| *rank > 0)
            .ok_or(ConfigError::InvalidRank { key }),
        Err(_) => Ok(default),
    }
}

/// Settings consumed by the scoring commands.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub data_dir: Option<PathBuf>,
    pub series_days: usize,
    pub tier_cut_points: TierCutPoints,
    pub lever_mode: LeverMode,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSeriesDays,
    InvalidRank { key: &'static str },
    TierOrder { high: usize, medium: usize },
    InvalidLeverMode(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSeriesDays => {
                write!(
                    f,
                    "ANALYTICS_SERIES_DAYS must be an integer from 0 to {MAX_SERIES_DAYS}"
                )
            }
            ConfigError::InvalidRank { key } => write!(f, "{key} must be a positive integer"),
            ConfigError::TierOrder { high, medium } => write!(
                f,
                "medium tier cut-off ({medium}) must not be above the high tier cut-off ({high})"
            ),
            ConfigError::InvalidLeverMode(value) => write!(
                f,
                "ANALYTICS_LEVER_MODE must be 'clamp' or 'strict', got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
