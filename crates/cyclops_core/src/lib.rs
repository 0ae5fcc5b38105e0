//! Core analysis logic for Cyclops.
//! Reads Cyclus output databases, reshapes transactions into dense time
//! series, renders plots/CSV, and generates simulator input fragments.

pub mod config;
pub mod db;
pub mod export;
pub mod input;
pub mod logging;
pub mod model;
pub mod plot;
pub mod repo;
pub mod series;
pub mod service;

pub use config::{load_config, ConfigError, CyclopsConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::agent::{AgentEntry, AgentId, AgentSelector, FluxDirection, Institution};
pub use model::nuclide::{NucId, Nuclide, NuclideError};
pub use model::timeline::SimInfo;
pub use repo::{
    AgentRepository, MaterialRepository, MetricRepository, RepoError, RepoResult,
    SqliteAgentRepository, SqliteMaterialRepository, SqliteMetricRepository,
};
pub use series::{MassUnit, SeriesMap};
pub use service::analysis_service::{AnalysisService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
