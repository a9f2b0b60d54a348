//! CSV import of the entity collections consumed by the engine.

use crate::domain::{BrokerRecord, EntityKind, EntityMetrics, ScoredEntity};
use crate::funnel::FunnelCounters;
use crate::rhi::RhiMetricSet;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ENTITIES_FILE: &str = "entities.csv";
pub const BROKERS_FILE: &str = "brokers.csv";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dataset CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown entity kind '{kind}'")]
    UnknownKind { row: usize, kind: String },
}

/// Entity and broker records supplied to the engine by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityDataset {
    pub entities: Vec<ScoredEntity>,
    pub brokers: Vec<BrokerRecord>,
}

impl EntityDataset {
    pub fn new(entities: Vec<ScoredEntity>, brokers: Vec<BrokerRecord>) -> Self {
        Self { entities, brokers }
    }

    /// Loads `entities.csv` and, when present, `brokers.csv` from `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, DatasetError> {
        let dir = dir.as_ref();
        let entities_path = dir.join(ENTITIES_FILE);
        let entities = parse_entities(open(&entities_path)?)?;

        let brokers_path = dir.join(BROKERS_FILE);
        let brokers = if brokers_path.exists() {
            parse_brokers(open(&brokers_path)?)?
        } else {
            debug!(path = %brokers_path.display(), "no broker file, skipping");
            Vec::new()
        };

        Ok(Self { entities, brokers })
    }

    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &ScoredEntity> + '_ {
        self.entities.iter().filter(move |entity| entity.kind == kind)
    }
}

fn open(path: &Path) -> Result<std::fs::File, DatasetError> {
    std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input)
}

pub fn parse_entities<R: Read>(input: R) -> Result<Vec<ScoredEntity>, DatasetError> {
    let mut entities = Vec::new();
    for (index, row) in reader(input).deserialize::<EntityRow>().enumerate() {
        entities.push(row?.into_entity(index + 1)?);
    }
    Ok(entities)
}

pub fn parse_brokers<R: Read>(input: R) -> Result<Vec<BrokerRecord>, DatasetError> {
    let mut brokers = Vec::new();
    for row in reader(input).deserialize::<BrokerRow>() {
        brokers.push(row?.into_record());
    }
    Ok(brokers)
}

#[derive(Debug, Deserialize)]
struct EntityRow {
    id: String,
    name: String,
    kind: String,
    revenue: Option<f64>,
    followers: Option<u64>,
    win_rate_pct: Option<f64>,
    max_drawdown_pct: Option<f64>,
    avg_leverage: Option<f64>,
    return_12m_pct: Option<f64>,
    months_active: Option<f64>,
    retention_30d_pct: Option<f64>,
    members: Option<u64>,
    high_harm_member_pct: Option<f64>,
    engagement_pct: Option<f64>,
    baseline_score: Option<u16>,
    registered: Option<u64>,
    first_copy: Option<u64>,
    active: Option<u64>,
    retained_30d: Option<u64>,
}

impl EntityRow {
    fn into_entity(self, row: usize) -> Result<ScoredEntity, DatasetError> {
        let kind = EntityKind::parse(&self.kind).ok_or_else(|| DatasetError::UnknownKind {
            row,
            kind: self.kind.clone(),
        })?;

        let funnel = match (self.registered, self.first_copy, self.active, self.retained_30d) {
            (Some(registered), Some(first_copy), Some(active), Some(retained_30d)) => Some(
                FunnelCounters::new(registered, first_copy, active, retained_30d),
            ),
            (None, None, None, None) => None,
            _ => {
                warn!(id = %self.id, "partial funnel counters, inferring from followers");
                None
            }
        };

        Ok(ScoredEntity {
            id: self.id,
            name: self.name,
            kind,
            metrics: EntityMetrics {
                revenue: self.revenue.unwrap_or_default(),
                followers: self.followers.unwrap_or_default(),
                win_rate_pct: self.win_rate_pct.unwrap_or_default(),
                max_drawdown_pct: self.max_drawdown_pct.unwrap_or_default(),
                avg_leverage: self.avg_leverage.unwrap_or_default(),
                return_12m_pct: self.return_12m_pct.unwrap_or_default(),
                months_active: self.months_active.unwrap_or_default(),
                retention_30d_pct: self.retention_30d_pct.unwrap_or_default(),
                members: self.members.unwrap_or_default(),
                high_harm_member_pct: self.high_harm_member_pct.unwrap_or_default(),
                engagement_pct: self.engagement_pct.unwrap_or_default(),
            },
            baseline_score: self.baseline_score.map(|score| score.min(1000)),
            funnel,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BrokerRow {
    id: String,
    name: String,
    avg_leverage: f64,
    high_harm_score_pct: f64,
    median_time_to_failure: f64,
    herding_score: f64,
    stop_loss_usage_rate: f64,
    volatility_exposure_pct: f64,
    offshore_exposure_pct: f64,
}

impl BrokerRow {
    fn into_record(self) -> BrokerRecord {
        BrokerRecord {
            id: self.id,
            name: self.name,
            rhi: RhiMetricSet {
                avg_leverage: self.avg_leverage,
                high_harm_score_pct: self.high_harm_score_pct,
                median_time_to_failure: self.median_time_to_failure,
                herding_score: self.herding_score,
                stop_loss_usage_rate: self.stop_loss_usage_rate,
                volatility_exposure_pct: self.volatility_exposure_pct,
                offshore_exposure_pct: self.offshore_exposure_pct,
            },
        }
    }
}
