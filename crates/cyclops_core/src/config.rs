//! `cyclops.toml` run configuration.
//!
//! # Responsibility
//! - Load output, plotting and input-generation settings from TOML.
//! - Supply defaults for every omitted field.
//!
//! # Invariants
//! - `reactor_specs` always carries `PWR` and `BWR` entries.
//! - `output.unit` parses as a [`MassUnit`].
//! - Plot dimensions are non-zero.

use crate::series::MassUnit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Reactor type every unknown type falls back to.
pub const FALLBACK_REACTOR_TYPE: &str = "PWR";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CyclopsConfig {
    pub output: OutputConfig,
    pub plot: PlotConfig,
    /// Assembly specs keyed by reactor type (`PWR`, `BWR`, ...).
    pub reactor_specs: BTreeMap<String, ReactorSpec>,
    /// Initial facility counts rendered as `countries_infra`.
    pub deployment: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// `kg` or `t`.
    pub unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
}

/// Fuel assembly layout of one reactor type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReactorSpec {
    /// Assembly mass in kg.
    pub assem_size: u32,
    pub n_assem_core: u32,
    pub n_assem_batch: u32,
}

impl Default for ReactorSpec {
    fn default() -> Self {
        Self {
            assem_size: 33000,
            n_assem_core: 3,
            n_assem_batch: 1,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            unit: MassUnit::Tonnes.symbol().to_string(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

impl Default for CyclopsConfig {
    fn default() -> Self {
        let reactor_specs = ["PWR", "BWR"]
            .into_iter()
            .map(|kind| (kind.to_string(), ReactorSpec::default()))
            .collect();
        let deployment = ["n_mine", "n_enrichment", "n_reactor", "n_repository"]
            .into_iter()
            .map(|key| (key.to_string(), 1))
            .collect();
        Self {
            output: OutputConfig::default(),
            plot: PlotConfig::default(),
            reactor_specs,
            deployment,
        }
    }
}

impl CyclopsConfig {
    /// Parses TOML text and fills in the default reactor specs.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        for kind in ["PWR", "BWR"] {
            config
                .reactor_specs
                .entry(kind.to_string())
                .or_insert_with(ReactorSpec::default);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn mass_unit(&self) -> MassUnit {
        MassUnit::parse(&self.output.unit).unwrap_or_default()
    }

    /// Spec for `reactor_type`; unknown types get the PWR spec and `false`.
    pub fn reactor_spec(&self, reactor_type: &str) -> (ReactorSpec, bool) {
        match self.reactor_specs.get(reactor_type) {
            Some(spec) => (*spec, true),
            None => (
                self.reactor_specs
                    .get(FALLBACK_REACTOR_TYPE)
                    .copied()
                    .unwrap_or_default(),
                false,
            ),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if MassUnit::parse(&self.output.unit).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown output unit `{}`",
                self.output.unit
            )));
        }
        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "plot size must be non-zero, got {}x{}",
                self.plot.width, self.plot.height
            )));
        }
        Ok(())
    }
}

/// Loads `path`, or returns defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<CyclopsConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(CyclopsConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    CyclopsConfig::from_toml_str(&text, path)
}

#[cfg(test)]
mod tests {
    use super::{load_config, ConfigError, CyclopsConfig, ReactorSpec};
    use crate::series::MassUnit;
    use std::path::Path;

    #[test]
    fn defaults_cover_pwr_and_bwr() {
        let config = load_config(None).unwrap();
        assert_eq!(config.reactor_specs.len(), 2);
        assert_eq!(config.reactor_spec("BWR"), (ReactorSpec::default(), true));
        assert_eq!(config.plot.width, 1024);
        assert_eq!(config.mass_unit(), MassUnit::Tonnes);
        assert_eq!(config.deployment.get("n_reactor"), Some(&1));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let text = r#"
            [output]
            unit = "kg"

            [reactor_specs.CANDU]
            assem_size = 19
            n_assem_core = 4560
            n_assem_batch = 16
        "#;
        let config = CyclopsConfig::from_toml_str(text, Path::new("cyclops.toml")).unwrap();

        assert_eq!(config.mass_unit(), MassUnit::Kilograms);
        assert_eq!(config.plot.height, 768);
        assert!(config.reactor_specs.contains_key("PWR"));
        assert_eq!(config.reactor_spec("CANDU").0.n_assem_core, 4560);
    }

    #[test]
    fn unknown_reactor_type_falls_back_to_pwr() {
        let config = CyclopsConfig::default();
        let (spec, known) = config.reactor_spec("MSR");
        assert!(!known);
        assert_eq!(spec, ReactorSpec::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = CyclopsConfig::from_toml_str("[output]\nunit = \"lb\"\n", Path::new("c.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = CyclopsConfig::from_toml_str("[plot]\nwidth = 0\n", Path::new("c.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = CyclopsConfig::from_toml_str("[nope]\n", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
