use cyclops_core::plot::{
    combined_line_plot, double_axis_plot, multiple_line_plots, stacked_bar_chart, Chart, PlotError,
};
use cyclops_core::{SeriesMap, SimInfo};
use std::path::Path;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn sample_series() -> SeriesMap {
    let mut series = SeriesMap::new();
    series.insert("usa_government", vec![0.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
    series.insert("france_government", vec![0.5, 0.5, 1.5, 1500.0, 1500.0, 0.0]);
    series
}

fn chart() -> Chart {
    Chart::new("Installed capacity", "Year", "Capacity [GWe]").with_size(320, 240)
}

fn assert_png(path: &Path) {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.len() > PNG_MAGIC.len());
    assert_eq!(&bytes[..8], &PNG_MAGIC[..]);
}

#[test]
fn multiple_line_plots_write_one_file_per_key() {
    let dir = tempfile::tempdir().unwrap();
    let written = multiple_line_plots(
        &sample_series(),
        &SimInfo::new(2000, 1, 6),
        &chart(),
        dir.path(),
        "capacity",
    )
    .unwrap();

    assert_eq!(
        written,
        vec![
            dir.path().join("usa_capacity.png"),
            dir.path().join("france_capacity.png"),
        ]
    );
    for path in &written {
        assert_png(path);
    }
}

#[test]
fn combined_and_stacked_charts_write_png() {
    let dir = tempfile::tempdir().unwrap();
    let info = SimInfo::new(2000, 1, 6);

    let line = dir.path().join("nested/combined.png");
    combined_line_plot(&sample_series(), &info, &chart(), &line).unwrap();
    assert_png(&line);

    let mut series = sample_series();
    series.insert("idle_government", vec![0.0; 6]);
    let bars = dir.path().join("stacked.png");
    stacked_bar_chart(&series, &info, &chart(), &bars).unwrap();
    assert_png(&bars);
}

#[test]
fn double_axis_plot_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let info = SimInfo::new(2000, 1, 6);
    let mut count = SeriesMap::new();
    count.insert("usa_government", vec![1.0, 1.0, 2.0, 2.0, 2.0, 1.0]);

    let path = dir.path().join("dual.png");
    double_axis_plot(&sample_series(), &count, &info, &chart(), "Reactors", &path).unwrap();
    assert_png(&path);
}

#[test]
fn existing_chart_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("combined.png");
    std::fs::write(&path, b"stale").unwrap();

    combined_line_plot(&sample_series(), &SimInfo::new(2000, 1, 6), &chart(), &path).unwrap();
    assert_png(&path);
}

#[test]
fn empty_inputs_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.png");

    let err = combined_line_plot(&SeriesMap::new(), &SimInfo::new(2000, 1, 6), &chart(), &path)
        .unwrap_err();
    assert!(matches!(err, PlotError::EmptySeries(_)));

    let err = combined_line_plot(&sample_series(), &SimInfo::new(2000, 1, 0), &chart(), &path)
        .unwrap_err();
    assert!(matches!(err, PlotError::EmptySeries(_)));
    assert!(!path.exists());
}

fn render_combined(dir: &Path, file: &str, series: &SeriesMap, chart: &Chart) -> Vec<u8> {
    let path = dir.join(file);
    combined_line_plot(series, &SimInfo::new(2000, 1, 6), chart, &path).unwrap();
    std::fs::read(&path).unwrap()
}

#[test]
fn rendering_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let first = render_combined(dir.path(), "a.png", &sample_series(), &chart());
    let second = render_combined(dir.path(), "b.png", &sample_series(), &chart());
    assert_eq!(first, second);
}

#[test]
fn chart_title_is_drawn() {
    let dir = tempfile::tempdir().unwrap();
    let series = sample_series();
    let one = render_combined(
        dir.path(),
        "one.png",
        &series,
        &Chart::new("Title One", "Year", "Mass").with_size(320, 240),
    );
    let two = render_combined(
        dir.path(),
        "two.png",
        &series,
        &Chart::new("Title Two", "Year", "Mass").with_size(320, 240),
    );
    assert_ne!(one, two);
}

#[test]
fn series_set_changes_the_image() {
    let dir = tempfile::tempdir().unwrap();
    let mut single = SeriesMap::new();
    single.insert("usa_government", vec![0.0, 1.0, 2.0, 2.0, 3.0, 3.0]);

    let both = render_combined(dir.path(), "both.png", &sample_series(), &chart());
    let one = render_combined(dir.path(), "one.png", &single, &chart());
    assert_ne!(both, one);

    let stacked_both = dir.path().join("stacked_both.png");
    let stacked_one = dir.path().join("stacked_one.png");
    let info = SimInfo::new(2000, 1, 6);
    stacked_bar_chart(&sample_series(), &info, &chart(), &stacked_both).unwrap();
    stacked_bar_chart(&single, &info, &chart(), &stacked_one).unwrap();
    assert_ne!(
        std::fs::read(&stacked_both).unwrap(),
        std::fs::read(&stacked_one).unwrap()
    );
}

#[test]
fn government_suffix_is_dropped_from_file_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut series = SeriesMap::new();
    series.insert("usa_government", vec![1.0, 2.0, 3.0]);

    let written = multiple_line_plots(
        &series,
        &SimInfo::new(2010, 1, 3),
        &chart(),
        dir.path(),
        "power",
    )
    .unwrap();

    assert_eq!(written, vec![dir.path().join("usa_power.png")]);
    assert!(!dir.path().join("usa_government_power.png").exists());
    assert_png(&written[0]);
}
