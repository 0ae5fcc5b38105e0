//! Dense time-series reconstruction.
//!
//! # Responsibility
//! - Turn sparse `(time, value)` query rows into zero-filled per-timestep
//!   arrays, optionally cumulative.
//! - Split composition-level flows into per-isotope flows.
//! - Derive installed capacity and reactor counts from reactor lifecycles.
//!
//! # Invariants
//! - Every dense series has exactly `duration` entries.
//! - A cumulative series is the prefix sum of its non-cumulative counterpart.
//! - [`SeriesMap`] keeps keys in insertion order.

use std::fmt::{Display, Formatter};

mod capacity;
mod dense;
mod isotope;

pub use capacity::{capacity_calc, PowerSeries};
pub use dense::{average, ratio_series, sum_series, timeseries, timeseries_cum};
pub use isotope::{
    isotope_points_to_transactions, isotope_timeseries, isotope_transactions,
    IsotopeTransactions,
};

/// Unit for mass-valued series. Simulator quantities are kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MassUnit {
    #[default]
    Kilograms,
    Tonnes,
}

impl MassUnit {
    /// Multiplier applied to a kilogram value.
    pub fn factor(self) -> f64 {
        match self {
            Self::Kilograms => 1.0,
            Self::Tonnes => 0.001,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Kilograms => "kg",
            Self::Tonnes => "t",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "kg" | "kilograms" => Some(Self::Kilograms),
            "t" | "tonnes" | "tons" | "mthm" => Some(Self::Tonnes),
            _ => None,
        }
    }
}

impl Display for MassUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Insertion-ordered map from label to dense series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesMap {
    entries: Vec<(String, Vec<f64>)>,
}

impl SeriesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `values` under `key`; an existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<f64>) -> Option<Vec<f64>> {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, values)),
            None => {
                self.entries.push((key, values));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[f64]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Element-wise sum over every key.
    pub fn total(&self) -> Vec<f64> {
        sum_series(self.entries.iter().map(|(_, values)| values.as_slice()))
    }

    /// Sum of every value in every series.
    pub fn grand_total(&self) -> f64 {
        self.entries
            .iter()
            .flat_map(|(_, values)| values.iter())
            .sum()
    }

    /// Multiplies every value by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for (_, values) in &mut self.entries {
            values.iter_mut().for_each(|value| *value *= factor);
        }
    }
}

impl FromIterator<(String, Vec<f64>)> for SeriesMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<f64>)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, values) in iter {
            map.insert(key, values);
        }
        map
    }
}

impl IntoIterator for SeriesMap {
    type Item = (String, Vec<f64>);
    type IntoIter = std::vec::IntoIter<(String, Vec<f64>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
