//! Chart renderers.

use super::style::{
    display_label, format_plain, format_thousands, register_fonts, series_color, title_font,
    THOUSANDS_THRESHOLD,
};
use super::{Chart, PlotError, PlotResult};
use crate::model::timeline::SimInfo;
use crate::series::SeriesMap;
use log::{info, warn};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::fmt::Display;
use std::ops::Range;
use std::path::{Path, PathBuf};

const LEFT_AXIS_COLOR: RGBColor = RGBColor(214, 39, 40);
const RIGHT_AXIS_COLOR: RGBColor = RGBColor(31, 119, 180);
/// Fraction of one timestep covered by a bar.
const BAR_FILL: f64 = 0.8;

/// One PNG per key, written to `<out_dir>/<label>_<name>.png`.
///
/// Returns the written paths in key order.
pub fn multiple_line_plots(
    series: &SeriesMap,
    info: &SimInfo,
    chart: &Chart,
    out_dir: &Path,
    name: &str,
) -> PlotResult<Vec<PathBuf>> {
    ensure_drawable(series, info, name)?;
    register_fonts()?;
    std::fs::create_dir_all(out_dir)?;
    let thousands = series.grand_total() > THOUSANDS_THRESHOLD;

    let mut written = Vec::with_capacity(series.len());
    for (index, (key, values)) in series.iter().enumerate() {
        let label = display_label(key);
        let path = out_dir.join(format!("{label}_{name}.png"));
        let color = series_color(index, series.len());
        {
            let root = BitMapBackend::new(&path, chart.size).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;
            let mut plot = ChartBuilder::on(&root)
                .caption(&chart.title, title_font())
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(80)
                .build_cartesian_2d(year_range(info), value_range([values]))
                .map_err(render_err)?;
            configure_mesh(&mut plot, chart, thousands)?;
            plot.draw_series(LineSeries::new(points(info, values), color.stroke_width(2)))
                .map_err(render_err)?
                .label(label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            draw_legend(&mut plot)?;
            root.present().map_err(render_err)?;
        }
        log_written(&path, "line");
        written.push(path);
    }
    Ok(written)
}

/// Every key as one line in a single chart at `path`.
pub fn combined_line_plot(
    series: &SeriesMap,
    info: &SimInfo,
    chart: &Chart,
    path: &Path,
) -> PlotResult<()> {
    ensure_drawable(series, info, &chart.title)?;
    register_fonts()?;
    ensure_parent(path)?;
    let thousands = series.grand_total() > THOUSANDS_THRESHOLD;
    {
        let root = BitMapBackend::new(path, chart.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let mut plot = ChartBuilder::on(&root)
            .caption(&chart.title, title_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(
                year_range(info),
                value_range(series.iter().map(|(_, values)| values)),
            )
            .map_err(render_err)?;
        configure_mesh(&mut plot, chart, thousands)?;

        for (index, (key, values)) in series.iter().enumerate() {
            let color = series_color(index, series.len());
            plot.draw_series(LineSeries::new(points(info, values), color.stroke_width(2)))
                .map_err(render_err)?
                .label(display_label(key))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        draw_legend(&mut plot)?;
        root.present().map_err(render_err)?;
    }
    log_written(path, "combined_line");
    Ok(())
}

/// Keys stacked as bars per timestep at `path`.
///
/// All-zero series are skipped; the legend is drawn only for more than one
/// key.
pub fn stacked_bar_chart(
    series: &SeriesMap,
    info: &SimInfo,
    chart: &Chart,
    path: &Path,
) -> PlotResult<()> {
    ensure_drawable(series, info, &chart.title)?;
    register_fonts()?;
    ensure_parent(path)?;
    let thousands = series.grand_total() > THOUSANDS_THRESHOLD;
    let stack_top = series.total();
    let stack_bottom: Vec<f64> = {
        let mut lowest = vec![0.0; info.duration];
        let mut running = vec![0.0; info.duration];
        for (_, values) in series.iter() {
            for (step, value) in values.iter().enumerate().take(info.duration) {
                running[step] += value;
                lowest[step] = f64::min(lowest[step], running[step]);
            }
        }
        lowest
    };

    {
        let root = BitMapBackend::new(path, chart.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let mut plot = ChartBuilder::on(&root)
            .caption(&chart.title, title_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(
                year_range(info),
                value_range([stack_top.as_slice(), stack_bottom.as_slice()]),
            )
            .map_err(render_err)?;
        configure_mesh(&mut plot, chart, thousands)?;

        let bar_width = BAR_FILL / 12.0;
        let mut base = vec![0.0; info.duration];
        for (index, (key, values)) in series.iter().enumerate() {
            let label = display_label(key);
            if values.iter().sum::<f64>() == 0.0 {
                warn!("event=stacked_bar_chart module=plot status=skip series={label} reason=no_values");
                continue;
            }
            let color = series_color(index, series.len());
            let bars: Vec<Rectangle<(f64, f64)>> = values
                .iter()
                .take(info.duration)
                .enumerate()
                .map(|(step, value)| {
                    let x = info.year_of(step as i64);
                    let bottom = base[step];
                    base[step] += value;
                    Rectangle::new([(x, bottom), (x + bar_width, base[step])], color.filled())
                })
                .collect();
            plot.draw_series(bars)
                .map_err(render_err)?
                .label(label)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
        }
        if series.len() > 1 {
            draw_legend(&mut plot)?;
        }
        root.present().map_err(render_err)?;
    }
    log_written(path, "stacked_bar");
    Ok(())
}

/// Bars of `left` against the left axis and lines of `right` against a
/// second axis labelled `right_label`, written to `path`.
pub fn double_axis_plot(
    left: &SeriesMap,
    right: &SeriesMap,
    info: &SimInfo,
    chart: &Chart,
    right_label: &str,
    path: &Path,
) -> PlotResult<()> {
    ensure_drawable(left, info, &chart.title)?;
    ensure_drawable(right, info, right_label)?;
    register_fonts()?;
    ensure_parent(path)?;
    let left_thousands = left.grand_total() > THOUSANDS_THRESHOLD;
    let right_thousands = right.grand_total() > THOUSANDS_THRESHOLD;

    {
        let root = BitMapBackend::new(path, chart.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let mut primary = ChartBuilder::on(&root)
            .caption(&chart.title, title_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .right_y_label_area_size(80)
            .build_cartesian_2d(
                year_range(info),
                value_range(left.iter().map(|(_, values)| values)),
            )
            .map_err(render_err)?;
        configure_mesh(&mut primary, chart, left_thousands)?;

        let mut plot = primary.set_secondary_coord(
            year_range(info),
            value_range(right.iter().map(|(_, values)| values)),
        );
        let right_formatter = tick_formatter(right_thousands);
        plot.configure_secondary_axes()
            .y_desc(right_label)
            .y_label_formatter(&right_formatter)
            .draw()
            .map_err(render_err)?;

        let bar_width = BAR_FILL / 12.0;
        for (key, values) in left.iter() {
            let label = display_label(key);
            if values.iter().sum::<f64>() == 0.0 {
                warn!("event=double_axis_plot module=plot status=skip series={label} reason=no_values");
                continue;
            }
            let bars: Vec<Rectangle<(f64, f64)>> = values
                .iter()
                .take(info.duration)
                .enumerate()
                .map(|(step, value)| {
                    let x = info.year_of(step as i64);
                    Rectangle::new([(x, 0.0), (x + bar_width, *value)], LEFT_AXIS_COLOR.filled())
                })
                .collect();
            plot.draw_series(bars)
                .map_err(render_err)?
                .label(label)
                .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], LEFT_AXIS_COLOR.filled()));
        }

        for (index, (key, values)) in right.iter().enumerate() {
            let label = display_label(key);
            if values.iter().sum::<f64>() == 0.0 {
                warn!("event=double_axis_plot module=plot status=skip series={label} reason=no_values");
                continue;
            }
            let color = right_line_color(index);
            plot.draw_secondary_series(LineSeries::new(points(info, values), color.stroke_width(2)))
                .map_err(render_err)?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        draw_legend(&mut *plot)?;
        root.present().map_err(render_err)?;
    }
    log_written(path, "double_axis");
    Ok(())
}

fn configure_mesh<DB: DrawingBackend>(
    plot: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    chart: &Chart,
    thousands: bool,
) -> PlotResult<()> {
    let formatter = tick_formatter(thousands);
    plot.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .x_label_formatter(&|year: &f64| format!("{year:.0}"))
        .y_label_formatter(&formatter)
        .draw()
        .map_err(render_err)
}

fn draw_legend<'a, DB, CT>(plot: &mut ChartContext<'a, DB, CT>) -> PlotResult<()>
where
    DB: DrawingBackend + 'a,
    CT: CoordTranslate,
{
    plot.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)
}

fn tick_formatter(thousands: bool) -> impl Fn(&f64) -> String {
    move |value: &f64| {
        if thousands {
            format_thousands(*value)
        } else {
            format_plain(*value)
        }
    }
}

fn right_line_color(index: usize) -> RGBColor {
    const SHADES: [RGBColor; 4] = [
        RIGHT_AXIS_COLOR,
        RGBColor(23, 190, 207),
        RGBColor(44, 62, 140),
        RGBColor(120, 160, 220),
    ];
    SHADES[index % SHADES.len()]
}

fn points<'a>(info: &'a SimInfo, values: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
    values
        .iter()
        .take(info.duration)
        .enumerate()
        .map(|(step, value)| (info.year_of(step as i64), *value))
}

fn year_range(info: &SimInfo) -> Range<f64> {
    info.year_of(0)..info.end_year()
}

/// `[min(0, lowest), highest * 1.05]`, widened to `[0, 1]` for flat data.
fn value_range<'a>(series: impl IntoIterator<Item = &'a [f64]>) -> Range<f64> {
    let mut low = 0.0_f64;
    let mut high = 0.0_f64;
    for value in series.into_iter().flatten().filter(|value| value.is_finite()) {
        low = low.min(*value);
        high = high.max(*value);
    }
    if high - low <= f64::EPSILON {
        return low..low + 1.0;
    }
    low..high * 1.05 + f64::EPSILON
}

fn ensure_drawable(series: &SeriesMap, info: &SimInfo, what: &str) -> PlotResult<()> {
    if series.is_empty() {
        return Err(PlotError::EmptySeries(format!("`{what}` has no series")));
    }
    if info.duration == 0 {
        return Err(PlotError::EmptySeries(format!(
            "`{what}` spans zero timesteps"
        )));
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> PlotResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn render_err<E: Display>(err: E) -> PlotError {
    PlotError::Render(err.to_string())
}

fn log_written(path: &Path, kind: &str) {
    info!(
        "event=plot_write module=plot status=ok kind={kind} path={}",
        path.display()
    );
}
