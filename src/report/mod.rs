//! Dashboard assembly: turns a dataset into serialisable view records and
//! derives plain-language observations from them.

mod insights;
mod summary;
pub mod views;

pub use summary::{
    broker_table, funnel_view, leaderboard, market_view, DashboardReport, ReportOptions,
};
pub use views::{
    BrokerHarmEntry, DashboardInsights, DashboardSummary, FunnelView, LeaderboardEntry,
    MarketHarmView,
};

pub(crate) use insights::generate_insights;
