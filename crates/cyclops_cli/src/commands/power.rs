//! Capacity charts and the default analysis bundle.

use super::open;
use crate::output::{
    chart, from_tonnes, mass_label, print_summary, write_chart, write_csv, ChartKind, OutputArgs,
};
use crate::RunContext;
use anyhow::{Context, Result};
use clap::Args;
use cyclops_core::plot::double_axis_plot;
use cyclops_core::{AnalysisService, SeriesMap, SimInfo};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PowerCommand {
    /// Cyclus output database
    pub db: PathBuf,
    /// Also write `power.csv` and `number.csv`
    #[arg(long)]
    pub csv: bool,
}

impl PowerCommand {
    pub fn run(&self, ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let info = service.sim_info()?;
        write_power(ctx, &service, &info, self.csv)
    }
}

/// Power of every reactor, or the fleet total, in MWe.
#[derive(Debug, Args)]
pub struct ReactorPowerCommand {
    /// Cyclus output database
    pub db: PathBuf,
    /// One `Total` series instead of one per reactor
    #[arg(long)]
    pub total: bool,
    #[arg(long)]
    pub cumulative: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

impl ReactorPowerCommand {
    pub fn run(&self, ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let series = service.reactor_power(self.cumulative, self.total)?;
        self.output.emit(
            ctx,
            &series,
            &service.sim_info()?,
            chart(ctx, "Reactor Power vs Time", "Power [MWe]"),
            "reactor_power",
        )
    }
}

#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Cyclus output database
    pub db: PathBuf,
}

impl ReportCommand {
    pub fn run(&self, ctx: &RunContext) -> Result<()> {
        let conn = open(&self.db)?;
        let service = AnalysisService::from_connection(&conn);
        let info = service.sim_info()?;
        info!(
            "event=report module=cli status=start db={} out_dir={}",
            self.db.display(),
            ctx.out_dir.display()
        );

        write_power(ctx, &service, &info, true)?;

        let mut fuel = SeriesMap::new();
        fuel.insert("fuel_into_reactors", service.fuel_into_reactors(true)?);
        fuel.insert("natural_uranium", service.natural_uranium(true)?);
        from_tonnes(ctx, &mut fuel);
        print_summary(&fuel);
        write_chart(
            ctx,
            &fuel,
            &info,
            chart(ctx, "Fuel and Natural Uranium vs Time", &mass_label(ctx)),
            "fuel_natural_u",
            ChartKind::Combined,
        )?;
        write_csv(ctx, &fuel, &info, "fuel_natural_u")?;

        let swu = service.swu(true)?;
        if swu.is_empty() {
            println!("no enrichment facilities; skipping SWU");
        } else {
            print_summary(&swu);
            write_chart(
                ctx,
                &swu,
                &info,
                chart(ctx, "Cumulative SWU vs Time", "SWU"),
                "swu",
                ChartKind::Combined,
            )?;
            write_csv(ctx, &swu, &info, "swu")?;
        }

        let utilization = service.uranium_utilization()?;
        println!("The Average Fuel Utilization Factor is: {}", utilization.average);

        info!("event=report module=cli status=ok");
        Ok(())
    }
}

fn write_power<A, M, T>(
    ctx: &RunContext,
    service: &AnalysisService<A, M, T>,
    info: &SimInfo,
    csv: bool,
) -> Result<()>
where
    A: cyclops_core::AgentRepository,
    M: cyclops_core::MaterialRepository,
    T: cyclops_core::MetricRepository,
{
    let power = service.power()?;
    if power.capacity.is_empty() {
        println!("no institutions; skipping power plots");
        return Ok(());
    }
    print_summary(&power.capacity);

    write_chart(
        ctx,
        &power.capacity,
        info,
        chart(ctx, "Net Capacity vs Time", "Net Capacity [GWe]"),
        "power_plot",
        ChartKind::Stacked,
    )?;
    write_chart(
        ctx,
        &power.reactor_count,
        info,
        chart(ctx, "Number of Reactors vs Time", "Number of Reactors"),
        "number_plot",
        ChartKind::Stacked,
    )?;

    let path = ctx.out_dir.join("power_number.png");
    double_axis_plot(
        &power.capacity,
        &power.reactor_count,
        info,
        &chart(ctx, "Capacity and Reactors vs Time", "Net Capacity [GWe]"),
        "Number of Reactors",
        &path,
    )
    .with_context(|| format!("failed to plot {}", path.display()))?;
    println!("wrote {}", path.display());

    if csv {
        write_csv(ctx, &power.capacity, info, "power")?;
        write_csv(ctx, &power.reactor_count, info, "number")?;
    }
    Ok(())
}
