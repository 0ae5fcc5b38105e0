//! SQLite access to Cyclus output databases.
//!
//! # Responsibility
//! - Open simulator output files for analysis.
//! - Check that the tables every analysis depends on are present.
//!
//! # Invariants
//! - File databases are opened read-only; this crate never writes to them.
//! - No query runs against a connection that failed schema validation.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{require_table, table_exists, validate_schema, REQUIRED_TABLES};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A table the requested analysis reads is absent.
    MissingTable(&'static str),
    /// The `Info` table has no simulation row.
    MissingInfo,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::MissingTable(table) => {
                write!(f, "table `{table}` not found in simulation output")
            }
            Self::MissingInfo => write!(f, "simulation output has no `Info` row"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::MissingTable(_) | Self::MissingInfo => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
