pub mod config;
pub mod dataset;
pub mod demo;
pub mod domain;
pub mod error;
pub mod funnel;
pub mod policy;
pub mod report;
pub mod rhi;
pub mod scoring;
pub mod series;
pub mod telemetry;
