//! Series and inventory analyses over one output database.

use super::open;
use crate::output::{chart, from_tonnes, mass_label, OutputArgs};
use crate::RunContext;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use cyclops_core::model::nuclide::name_of;
use cyclops_core::service::analysis_service::{CommodityFluxRequest, TradeRequest};
use cyclops_core::{AgentSelector, AnalysisService, FluxDirection, SeriesMap};
use std::path::PathBuf;

/// How a facility name is matched against `AgentEntry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatchBy {
    /// Substring of the archetype spec
    Spec,
    /// Exact prototype name
    Prototype,
}

impl MatchBy {
    fn selector(self, name: &str) -> AgentSelector {
        match self {
            Self::Spec => AgentSelector::spec(name),
            Self::Prototype => AgentSelector::prototype(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    In,
    Out,
}

impl From<Direction> for FluxDirection {
    fn from(value: Direction) -> Self {
        match value {
            Direction::In => FluxDirection::Influx,
            Direction::Out => FluxDirection::Outflux,
        }
    }
}

#[derive(Debug, Args)]
pub struct InfoCommand {
    /// Cyclus output database
    pub db: PathBuf,
}

impl InfoCommand {
    pub fn run(&self, _ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let info = service.sim_info()?;
        println!(
            "start={}-{:02} duration={} end_year={:.2}",
            info.init_year,
            info.init_month,
            info.duration,
            info.end_year()
        );
        println!("commodities: {}", service.commodities()?.join(", "));
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct AgentsCommand {
    /// Cyclus output database
    pub db: PathBuf,
}

impl AgentsCommand {
    pub fn run(&self, _ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        println!("AgentId\tKind\tSpec\tPrototype\tParentId\tLifetime\tEnterTime");
        for agent in service.list_agents()? {
            let parent = agent
                .parent_id
                .map_or_else(|| "-".to_string(), |id| id.to_string());
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                agent.agent_id,
                agent.kind,
                agent.spec,
                agent.prototype,
                parent,
                agent.lifetime,
                agent.enter_time
            );
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct FluxCommand {
    /// Cyclus output database
    pub db: PathBuf,
    /// Facility archetype or prototype
    pub facility: String,
    /// Commodity to follow; repeat for several
    #[arg(long = "commodity", required = true)]
    pub commodities: Vec<String>,
    #[arg(long, value_enum, default_value = "spec")]
    pub by: MatchBy,
    #[arg(long, value_enum, default_value = "in")]
    pub direction: Direction,
    /// Split by isotope instead of by commodity
    #[arg(long)]
    pub isotopic: bool,
    #[arg(long)]
    pub cumulative: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl FluxCommand {
    pub fn run(&self, ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let request = CommodityFluxRequest {
            selector: self.by.selector(&self.facility),
            commodities: self.commodities.clone(),
            direction: self.direction.into(),
            isotopic: self.isotopic,
            cumulative: self.cumulative,
        };
        let mut series = service
            .commodity_flux(&request)
            .with_context(|| format!("flux of `{}` failed", self.facility))?;
        from_tonnes(ctx, &mut series);

        let title = format!(
            "{} {} vs Time",
            self.facility,
            FluxDirection::from(self.direction).as_str()
        );
        let name = format!(
            "{}_{}",
            self.facility,
            FluxDirection::from(self.direction).as_str()
        );
        self.output.emit(
            ctx,
            &series,
            &service.sim_info()?,
            chart(ctx, &title, &mass_label(ctx)),
            &name,
        )
    }
}

#[derive(Debug, Args)]
pub struct IsotopesCommand {
    /// Cyclus output database
    pub db: PathBuf,
    /// Facility archetype or prototype
    pub facility: String,
    #[arg(long, value_enum, default_value = "spec")]
    pub by: MatchBy,
    #[arg(long, value_enum, default_value = "in")]
    pub direction: Direction,
    #[arg(long)]
    pub cumulative: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl IsotopesCommand {
    pub fn run(&self, ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let direction = FluxDirection::from(self.direction);
        let series = service.isotopic_flux(
            &self.by.selector(&self.facility),
            direction,
            self.cumulative,
        )?;

        self.output.emit(
            ctx,
            &series,
            &service.sim_info()?,
            chart(
                ctx,
                &format!("{} isotopic {} vs Time", self.facility, direction.as_str()),
                "Mass [kg]",
            ),
            &format!("{}_isotopic_{}", self.facility, direction.as_str()),
        )
    }
}

#[derive(Debug, Args)]
pub struct WhereCommand {
    /// Cyclus output database
    pub db: PathBuf,
    pub commodity: String,
    /// Sending prototype; repeat for several
    #[arg(long = "prototype", required = true)]
    pub prototypes: Vec<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl WhereCommand {
    pub fn run(&self, ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let mut series = service.where_commodity(&self.commodity, &self.prototypes)?;
        from_tonnes(ctx, &mut series);
        self.output.emit(
            ctx,
            &series,
            &service.sim_info()?,
            chart(
                ctx,
                &format!("Cumulative {} sent vs Time", self.commodity),
                &mass_label(ctx),
            ),
            &format!("{}_sources", self.commodity),
        )
    }
}

#[derive(Debug, Args)]
pub struct TradeCommand {
    /// Cyclus output database
    pub db: PathBuf,
    /// Sending facility archetype or prototype
    pub sender: String,
    /// Receiving facility archetype or prototype
    pub receiver: String,
    #[arg(long, value_enum, default_value = "spec")]
    pub by: MatchBy,
    #[arg(long)]
    pub isotopic: bool,
    #[arg(long)]
    pub cumulative: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl TradeCommand {
    pub fn run(&self, ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let request = TradeRequest {
            sender: self.by.selector(&self.sender),
            receiver: self.by.selector(&self.receiver),
            isotopic: self.isotopic,
            cumulative: self.cumulative,
        };
        let mut series = service.trade(&request)?;
        from_tonnes(ctx, &mut series);

        let title = format!("{} to {} vs Time", self.sender, self.receiver);
        self.output.emit(
            ctx,
            &series,
            &service.sim_info()?,
            chart(ctx, &title, &mass_label(ctx)),
            &format!("{}_{}", self.sender, self.receiver),
        )
    }
}

#[derive(Debug, Args)]
pub struct SwuCommand {
    /// Cyclus output database
    pub db: PathBuf,
    #[arg(long)]
    pub cumulative: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl SwuCommand {
    pub fn run(&self, ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let series = service.swu(self.cumulative)?;
        self.output.emit(
            ctx,
            &series,
            &service.sim_info()?,
            chart(ctx, "SWU vs Time", "SWU"),
            "swu",
        )
    }
}

#[derive(Debug, Args)]
pub struct FuelCommand {
    /// Cyclus output database
    pub db: PathBuf,
    /// Fuel commodity; repeat for several
    #[arg(long = "fuel", required = true)]
    pub fuels: Vec<String>,
    #[arg(long)]
    pub cumulative: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl FuelCommand {
    pub fn run(&self, ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let mut series = service.fuel_usage(&self.fuels, self.cumulative)?;
        from_tonnes(ctx, &mut series);
        self.output.emit(
            ctx,
            &series,
            &service.sim_info()?,
            chart(ctx, "Total Fuel Mass vs Time", &mass_label(ctx)),
            "total_fuel",
        )
    }
}

#[derive(Debug, Args)]
pub struct StockpileCommand {
    /// Cyclus output database
    pub db: PathBuf,
    /// Facility archetype, e.g. `Storage` or `Sink`
    pub facility: String,
    /// Print the end-of-run inventory per stream and isotope instead
    #[arg(long = "final")]
    pub final_only: bool,
    #[arg(long)]
    pub cumulative: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl StockpileCommand {
    pub fn run(&self, ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        if self.final_only {
            let report = service.final_stockpile(&self.facility)?;
            print!("{report}");
            return Ok(());
        }
        let mut series = service.stockpile(&self.facility, self.cumulative)?;
        from_tonnes(ctx, &mut series);
        self.output.emit(
            ctx,
            &series,
            &service.sim_info()?,
            chart(
                ctx,
                &format!("{} Stockpile vs Time", self.facility),
                &mass_label(ctx),
            ),
            &format!("{}_stockpile", self.facility),
        )
    }
}

#[derive(Debug, Args)]
pub struct UtilizationCommand {
    /// Cyclus output database
    pub db: PathBuf,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl UtilizationCommand {
    pub fn run(&self, ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let utilization = service.uranium_utilization()?;
        println!("The Average Fuel Utilization Factor is: {}", utilization.average);

        let mut series = SeriesMap::new();
        series.insert("uranium_utilization", utilization.series);
        self.output.emit(
            ctx,
            &series,
            &service.sim_info()?,
            chart(ctx, "U Utilization vs Time", "U Utilization Factor"),
            "u_util",
        )
    }
}

#[derive(Debug, Args)]
pub struct SnfCommand {
    /// Cyclus output database
    pub db: PathBuf,
}

impl SnfCommand {
    pub fn run(&self, _ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let inventory = service.spent_fuel_inventory()?;
        if inventory.is_empty() {
            println!("no material received by sink facilities");
        }
        for (nuc_id, mass) in inventory {
            println!("{} = {} kg", name_of(nuc_id), mass);
        }
        Ok(())
    }
}
