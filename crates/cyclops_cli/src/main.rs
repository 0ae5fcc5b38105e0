//! `cyclops` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments, load configuration and start file logging.
//! - Dispatch to one analysis or input-generation command per run.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cyclops_core::{default_log_level, init_logging, load_config, CyclopsConfig};
use std::path::PathBuf;

mod commands;
mod output;

use commands::{
    AgentsCommand, ConversionRatioCommand, FluxCommand, FuelCommand, InfoCommand,
    IsotopesCommand, MixRatioCommand, PowerCommand, ReactorPowerCommand, RenderInputCommand,
    ReportCommand, SnfCommand, StockpileCommand, SwuCommand, ThroughputCommand, TradeCommand,
    UtilizationCommand, WhereCommand, WriteReactorsCommand,
};

#[derive(Parser)]
#[command(name = "cyclops")]
#[command(about = "Analyze Cyclus output databases and generate Cyclus input files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for plots and CSV files (overrides `output.dir`)
    #[arg(short, long, global = true)]
    out_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; logging is off without it
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print simulation start, duration and traded commodities
    Info(InfoCommand),
    /// List every agent entry
    Agents(AgentsCommand),
    /// Commodity in/out flux of a facility group
    Flux(FluxCommand),
    /// Isotope masses in or out of a facility group, all commodities
    Isotopes(IsotopesCommand),
    /// Cumulative mass of a commodity sent by each prototype
    Where(WhereCommand),
    /// Material traded between two facility groups
    Trade(TradeCommand),
    /// Separative work per enrichment facility
    Swu(SwuCommand),
    /// Installed capacity and reactor count per institution
    Power(PowerCommand),
    /// Power of every reactor, or the fleet total
    ReactorPower(ReactorPowerCommand),
    /// Mass traded per fuel commodity
    Fuel(FuelCommand),
    /// Facility inventories over time or at the end of the run
    Stockpile(StockpileCommand),
    /// Fuel delivered per unit of natural uranium fed
    Utilization(UtilizationCommand),
    /// Conversion ratio between an input and an output composition
    ConversionRatio(ConversionRatioCommand),
    /// Best blend of separated material with depleted uranium
    MixRatio(MixRatioCommand),
    /// Isotopic content of spent fuel received by sinks
    Snf(SnfCommand),
    /// Natural uranium throughput a source must supply
    Throughput(ThroughputCommand),
    /// Default analysis bundle: power, fuel, natural uranium and SWU
    Report(ReportCommand),
    /// Render reactor and region blocks from a reactor list
    WriteReactors(WriteReactorsCommand),
    /// Render a complete input file from a fleet table
    RenderInput(RenderInputCommand),
}

/// Settings shared by every command.
pub struct RunContext {
    pub config: CyclopsConfig,
    pub out_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &log_dir.to_string_lossy())
            .map_err(anyhow::Error::msg)
            .context("failed to start file logging")?;
    }

    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    let out_dir = cli
        .out_dir
        .clone()
        .unwrap_or_else(|| config.output.dir.clone());
    let ctx = RunContext { config, out_dir };

    match &cli.command {
        Commands::Info(cmd) => cmd.run(&ctx),
        Commands::Agents(cmd) => cmd.run(&ctx),
        Commands::Flux(cmd) => cmd.run(&ctx),
        Commands::Isotopes(cmd) => cmd.run(&ctx),
        Commands::Where(cmd) => cmd.run(&ctx),
        Commands::Trade(cmd) => cmd.run(&ctx),
        Commands::Swu(cmd) => cmd.run(&ctx),
        Commands::Power(cmd) => cmd.run(&ctx),
        Commands::ReactorPower(cmd) => cmd.run(&ctx),
        Commands::Fuel(cmd) => cmd.run(&ctx),
        Commands::Stockpile(cmd) => cmd.run(&ctx),
        Commands::Utilization(cmd) => cmd.run(&ctx),
        Commands::ConversionRatio(cmd) => cmd.run(&ctx),
        Commands::MixRatio(cmd) => cmd.run(&ctx),
        Commands::Snf(cmd) => cmd.run(&ctx),
        Commands::Throughput(cmd) => cmd.run(&ctx),
        Commands::Report(cmd) => cmd.run(&ctx),
        Commands::WriteReactors(cmd) => cmd.run(&ctx),
        Commands::RenderInput(cmd) => cmd.run(&ctx),
    }
}
