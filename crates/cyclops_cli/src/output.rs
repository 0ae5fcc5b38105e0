//! Plot/CSV emission shared by the analysis commands.

use crate::RunContext;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use cyclops_core::export::write_series_csv;
use cyclops_core::plot::{combined_line_plot, multiple_line_plots, stacked_bar_chart, Chart};
use cyclops_core::{MassUnit, SeriesMap, SimInfo};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    /// One PNG per series
    Lines,
    /// Every series in one line chart
    Combined,
    /// Series stacked as bars
    Stacked,
}

/// Where a series result goes besides stdout.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Render a chart of this kind
    #[arg(long, value_enum)]
    pub plot: Option<ChartKind>,

    /// Also write `<name>.csv`
    #[arg(long)]
    pub csv: bool,

    /// Base name for written files
    #[arg(long)]
    pub name: Option<String>,
}

impl OutputArgs {
    pub fn emit(
        &self,
        ctx: &RunContext,
        series: &SeriesMap,
        info: &SimInfo,
        chart: Chart,
        default_name: &str,
    ) -> Result<()> {
        print_summary(series);
        let name = self.name.as_deref().unwrap_or(default_name);
        if self.csv {
            write_csv(ctx, series, info, name)?;
        }
        if let Some(kind) = self.plot {
            write_chart(ctx, series, info, chart, name, kind)?;
        }
        Ok(())
    }
}

pub fn chart(ctx: &RunContext, title: &str, y_label: &str) -> Chart {
    let plot = &ctx.config.plot;
    Chart::new(title, "Year", y_label).with_size(plot.width, plot.height)
}

/// Axis label for a mass series in the configured unit.
pub fn mass_label(ctx: &RunContext) -> String {
    format!("Mass [{}]", ctx.config.mass_unit())
}

/// Rescales tonnes to the configured unit.
pub fn from_tonnes(ctx: &RunContext, series: &mut SeriesMap) {
    series.scale(ctx.config.mass_unit().factor() / MassUnit::Tonnes.factor());
}

pub fn write_csv(ctx: &RunContext, series: &SeriesMap, info: &SimInfo, name: &str) -> Result<()> {
    let path = ctx.out_dir.join(format!("{name}.csv"));
    write_series_csv(&path, info, series)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

pub fn write_chart(
    ctx: &RunContext,
    series: &SeriesMap,
    info: &SimInfo,
    chart: Chart,
    name: &str,
    kind: ChartKind,
) -> Result<()> {
    let written: Vec<PathBuf> = match kind {
        ChartKind::Lines => multiple_line_plots(series, info, &chart, &ctx.out_dir, name)
            .with_context(|| format!("failed to plot `{name}`"))?,
        ChartKind::Combined | ChartKind::Stacked => {
            let path = ctx.out_dir.join(format!("{name}.png"));
            let drawn = if kind == ChartKind::Combined {
                combined_line_plot(series, info, &chart, &path)
            } else {
                stacked_bar_chart(series, info, &chart, &path)
            };
            drawn.with_context(|| format!("failed to plot `{name}`"))?;
            vec![path]
        }
    };
    for path in written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

/// One line per key: final value and peak.
pub fn print_summary(series: &SeriesMap) {
    if series.is_empty() {
        println!("(no series)");
    }
    for (key, values) in series.iter() {
        let last = values.last().copied().unwrap_or(0.0);
        let peak = values.iter().copied().fold(0.0_f64, f64::max);
        println!("{key}: final={last} peak={peak}");
    }
}
