//! Composition-level figures of merit.

use super::open;
use crate::RunContext;
use anyhow::Result;
use clap::{Args, ValueEnum};
use cyclops_core::service::reports::CompositionSource;
use cyclops_core::AnalysisService;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Entry of the `Recipes` table
    Recipe,
    /// First resource traded as this commodity
    Commodity,
}

impl SourceKind {
    fn source(self, name: &str) -> CompositionSource {
        match self {
            Self::Recipe => CompositionSource::Recipe(name.to_string()),
            Self::Commodity => CompositionSource::Commodity(name.to_string()),
        }
    }
}

#[derive(Debug, Args)]
pub struct ConversionRatioCommand {
    /// Cyclus output database
    pub db: PathBuf,
    /// Fresh fuel recipe or commodity
    #[arg(long)]
    pub input: String,
    /// Spent fuel recipe or commodity
    #[arg(long)]
    pub output: String,
    #[arg(long, value_enum, default_value = "recipe")]
    pub by: SourceKind,
}

impl ConversionRatioCommand {
    pub fn run(&self, _ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let ratio = service
            .conversion_ratio(&self.by.source(&self.input), &self.by.source(&self.output))?;
        println!("{ratio}");
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct MixRatioCommand {
    /// Cyclus output database
    pub db: PathBuf,
    /// Target fuel recipe
    #[arg(long)]
    pub fuel: String,
    /// Spent fuel recipe the separated material comes from
    #[arg(long)]
    pub spent: String,
    /// Depleted uranium recipe
    #[arg(long)]
    pub depleted: String,
    /// Atomic number of a separated element; repeat for several
    #[arg(long = "element", required = true)]
    pub elements: Vec<u32>,
}

impl MixRatioCommand {
    pub fn run(&self, _ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let mix = service.mix_ratio(&self.fuel, &self.spent, &self.depleted, &self.elements)?;
        print!("{mix}");
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct ThroughputCommand {
    /// Cyclus output database
    pub db: PathBuf,
    /// U235 mass fraction of the enriched product
    #[arg(long, default_value_t = 0.04)]
    pub product: f64,
    /// U235 mass fraction of the tails
    #[arg(long, default_value_t = 0.0025)]
    pub tails: f64,
}

impl ThroughputCommand {
    pub fn run(&self, _ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let throughput = service.source_throughput(self.product, self.tails)?;
        println!("The Source throughput should be: {throughput} kg per timestep");
        Ok(())
    }
}
