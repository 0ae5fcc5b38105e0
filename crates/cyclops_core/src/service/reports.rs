//! Structured results of the single-value analyses.
//!
//! Each report renders the plain-text summary the CLI prints through
//! `Display`.

use crate::model::nuclide::{name_of, NucId};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Isotope masses (kg) keyed by nucid.
pub type IsotopeInventory = BTreeMap<NucId, f64>;

/// Named inventories of every facility matching an archetype.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StockpileReport {
    pub facilities: Vec<FacilityStockpile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacilityStockpile {
    pub prototype: String,
    pub streams: Vec<StockpileStream>,
}

/// One inventory of one composition, with its isotope breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct StockpileStream {
    pub inventory_name: String,
    pub total_kg: f64,
    pub isotopes: Vec<(NucId, f64)>,
}

impl StockpileReport {
    pub fn total_kg(&self) -> f64 {
        self.facilities
            .iter()
            .flat_map(|facility| facility.streams.iter())
            .map(|stream| stream.total_kg)
            .sum()
    }
}

impl Display for StockpileReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for facility in &self.facilities {
            writeln!(f, "The Stockpile in {} :", facility.prototype)?;
            writeln!(f)?;
            for (index, stream) in facility.streams.iter().enumerate() {
                writeln!(
                    f,
                    "Stream {} ({}) Total = {} kg",
                    index + 1,
                    stream.inventory_name,
                    stream.total_kg
                )?;
                for (nuc_id, mass) in &stream.isotopes {
                    writeln!(f, "{} = {} kg", name_of(*nuc_id), mass)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Where a composition comes from when computing conversion ratios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionSource {
    /// Named entry of the `Recipes` table.
    Recipe(String),
    /// Composition of the first resource traded as this commodity.
    Commodity(String),
}

impl CompositionSource {
    pub fn name(&self) -> &str {
        match self {
            Self::Recipe(name) | Self::Commodity(name) => name.as_str(),
        }
    }
}

/// Mass fractions entering the conversion ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRatio {
    pub fission_products: f64,
    pub fissile_in: f64,
    pub fissile_out: f64,
    pub ratio: f64,
}

impl Display for ConversionRatio {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "The Conversion Factor is: {}", self.ratio)
    }
}

/// Best blend of separated material and depleted uranium.
#[derive(Debug, Clone, PartialEq)]
pub struct MixRatio {
    /// Fraction of separated material in the blend, in `[0, 1)`.
    pub ratio: f64,
    pub total_error: f64,
    pub nuclide_errors: Vec<MixNuclideError>,
}

/// Deviation of the blend from the target fuel for one nuclide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixNuclideError {
    pub nuc_id: NucId,
    pub absolute: f64,
    /// `None` when the target mass fraction is zero.
    pub percent: Option<f64>,
}

impl Display for MixRatio {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "The Optimal Ratio is: {}", self.ratio)?;
        for error in &self.nuclide_errors {
            match error.percent {
                Some(percent) => writeln!(
                    f,
                    "Error for {}: {} ({} %)",
                    name_of(error.nuc_id),
                    error.absolute,
                    percent
                )?,
                None => writeln!(f, "Error for {}: {}", name_of(error.nuc_id), error.absolute)?,
            }
        }
        Ok(())
    }
}

/// Fuel delivered per unit of natural uranium fed to enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct UraniumUtilization {
    pub series: Vec<f64>,
    pub average: f64,
}

impl Display for UraniumUtilization {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "The Simulation Average Uranium Utilization is: {}", self.average)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FacilityStockpile, MixNuclideError, MixRatio, StockpileReport, StockpileStream,
    };

    #[test]
    fn stockpile_report_lists_streams_with_isotope_names() {
        let report = StockpileReport {
            facilities: vec![FacilityStockpile {
                prototype: "separations".to_string(),
                streams: vec![StockpileStream {
                    inventory_name: "waste".to_string(),
                    total_kg: 10.0,
                    isotopes: vec![(942390000, 4.0), (942400000, 6.0)],
                }],
            }],
        };

        let text = report.to_string();
        assert!(text.starts_with("The Stockpile in separations :"));
        assert!(text.contains("Stream 1 (waste) Total = 10 kg"));
        assert!(text.contains("Pu239 = 4 kg"));
        assert_eq!(report.total_kg(), 10.0);
    }

    #[test]
    fn mix_ratio_omits_percent_for_zero_targets() {
        let mix = MixRatio {
            ratio: 0.1,
            total_error: 0.0,
            nuclide_errors: vec![MixNuclideError {
                nuc_id: 922350000,
                absolute: 0.0,
                percent: None,
            }],
        };
        let text = mix.to_string();
        assert!(text.contains("The Optimal Ratio is: 0.1"));
        assert!(text.contains("Error for U235: 0\n"));
    }
}
