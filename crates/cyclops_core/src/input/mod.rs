//! Simulator input generation from CSV fleet data and Jinja2 templates.
//!
//! # Responsibility
//! - Read reactor fleet tables.
//! - Render reactor, region, recipe and main-input fragments.
//!
//! # Invariants
//! - Every writer replaces its output file.
//! - Templates use Jinja2 syntax with Python-style map methods (`items()`).

use crate::model::nuclide::NuclideError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

mod fleet;
mod render;
mod template;

pub use fleet::{read_fleet_csv, read_reactor_list, read_recipe_csv, FleetRecord, ReactorListRow};
pub use render::{
    recipe_dict, write_main_input, write_reactor, write_reactors, write_recipes, write_region,
    DecayMode, Recipe, SimulationParams,
};
pub use template::{load_template, Template};

pub type InputResult<T> = Result<T, InputError>;

#[derive(Debug)]
pub enum InputError {
    Io { path: PathBuf, source: std::io::Error },
    Csv { path: PathBuf, source: csv::Error },
    Template(minijinja::Error),
    /// Recipe row naming something that is not a nuclide.
    Nuclide { path: PathBuf, source: NuclideError },
    /// Paired inputs of different lengths.
    LengthMismatch(String),
}

impl InputError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "`{}`: {source}", path.display()),
            Self::Csv { path, source } => {
                write!(f, "malformed csv `{}`: {source}", path.display())
            }
            Self::Template(err) => write!(f, "template error: {err}"),
            Self::Nuclide { path, source } => write!(f, "`{}`: {source}", path.display()),
            Self::LengthMismatch(message) => write!(f, "length mismatch: {message}"),
        }
    }
}

impl Error for InputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Template(err) => Some(err),
            Self::Nuclide { source, .. } => Some(source),
            Self::LengthMismatch(_) => None,
        }
    }
}

impl From<minijinja::Error> for InputError {
    fn from(value: minijinja::Error) -> Self {
        Self::Template(value)
    }
}

/// Replaces `path` with `body`, creating parent directories.
pub(crate) fn write_output(path: &Path, body: &str) -> InputResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| InputError::io(parent, err))?;
    }
    std::fs::write(path, body).map_err(|err| InputError::io(path, err))
}
