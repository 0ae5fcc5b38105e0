//! CLI commands.

pub mod analysis;
pub mod composition;
pub mod input;
pub mod power;

pub use analysis::{
    AgentsCommand, FluxCommand, FuelCommand, InfoCommand, IsotopesCommand, SnfCommand,
    StockpileCommand, SwuCommand, TradeCommand, UtilizationCommand, WhereCommand,
};
pub use composition::{ConversionRatioCommand, MixRatioCommand, ThroughputCommand};
pub use input::{RenderInputCommand, WriteReactorsCommand};
pub use power::{PowerCommand, ReactorPowerCommand, ReportCommand};

use anyhow::{Context, Result};
use cyclops_core::db::open_db;
use rusqlite::Connection;
use std::path::Path;

pub(crate) fn open(db: &Path) -> Result<Connection> {
    open_db(db).with_context(|| format!("failed to open simulation output {}", db.display()))
}
