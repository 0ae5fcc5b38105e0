//! PNG rendering of dense series.
//!
//! # Responsibility
//! - Draw line, stacked-bar and dual-axis charts of [`SeriesMap`]s against
//!   calendar years.
//! - Keep chart styling (labels, colors, axis formatting) in one place.
//!
//! # Invariants
//! - Existing files at the output path are replaced.
//! - A chart is only written when it has at least one timestep.
//!
//! [`SeriesMap`]: crate::series::SeriesMap

use std::error::Error;
use std::fmt::{Display, Formatter};

mod charts;
pub mod style;

pub use charts::{combined_line_plot, double_axis_plot, multiple_line_plots, stacked_bar_chart};

pub type PlotResult<T> = Result<T, PlotError>;

const DEFAULT_SIZE: (u32, u32) = (1024, 768);

/// Error for chart rendering.
#[derive(Debug)]
pub enum PlotError {
    Io(std::io::Error),
    /// Backend or layout failure reported by the drawing library.
    Render(String),
    /// Nothing to draw (no keys or zero duration).
    EmptySeries(String),
}

impl Display for PlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Render(message) => write!(f, "chart rendering failed: {message}"),
            Self::EmptySeries(message) => write!(f, "nothing to plot: {message}"),
        }
    }
}

impl Error for PlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Render(_) | Self::EmptySeries(_) => None,
        }
    }
}

impl From<std::io::Error> for PlotError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Title, axis labels and pixel size of one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub size: (u32, u32),
}

impl Chart {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            size: DEFAULT_SIZE,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }
}
