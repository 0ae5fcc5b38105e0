//! Material rows: transactions, resources and compositions.

use crate::model::nuclide::NucId;

/// Composition record identifier.
pub type QualId = i64;

/// A sparse `(time, value)` sample as returned by a grouped query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePoint {
    pub time: i64,
    pub value: f64,
}

impl TimePoint {
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Quantity of one composition moved at one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceFlow {
    pub time: i64,
    pub quantity: f64,
    pub qual_id: QualId,
}

/// One nuclide's share of a composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositionRow {
    pub qual_id: QualId,
    pub nuc_id: NucId,
    pub mass_frac: f64,
}

/// Isotope mass moved at one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsotopePoint {
    pub time: i64,
    pub nuc_id: NucId,
    pub mass: f64,
}

/// Total mass of one composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualMass {
    pub qual_id: QualId,
    pub quantity: f64,
}

/// One named inventory held by a facility.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryStream {
    pub inventory_name: String,
    pub qual_id: QualId,
    pub quantity: f64,
}
