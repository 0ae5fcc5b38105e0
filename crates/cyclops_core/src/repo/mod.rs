//! Query layer over the Cyclus output schema.
//!
//! # Responsibility
//! - Define read-only data access contracts used by analysis services.
//! - Keep SQL inside the persistence boundary.
//!
//! # Invariants
//! - Every user-supplied value (names, commodities, agent ids) is bound as a
//!   parameter; SQL text only ever contains fixed identifiers.
//! - An empty agent list yields an empty result without touching the database.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod agent_repo;
pub mod material_repo;
pub mod metric_repo;

pub use agent_repo::{AgentRepository, SqliteAgentRepository};
pub use material_repo::{MaterialRepository, SqliteMaterialRepository};
pub use metric_repo::{MetricRepository, SqliteMetricRepository};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for simulator output queries.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A named record (prototype, recipe, commodity, agent) does not exist.
    NotFound { kind: &'static str, key: String },
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, key } => write!(f, "{kind} not found: `{key}`"),
            Self::InvalidData(message) => write!(f, "invalid simulation data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// `?, ?, ?` placeholder list for an `IN (...)` clause.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
