//! Per-isotope views of material flows.

use super::{dense, MassUnit, SeriesMap};
use crate::model::material::{CompositionRow, IsotopePoint, QualId, ResourceFlow, TimePoint};
use crate::model::nuclide::{name_of, NucId};
use std::collections::{BTreeMap, HashMap};

/// Sparse isotope flows keyed by nuclide id, ascending.
pub type IsotopeTransactions = BTreeMap<NucId, Vec<TimePoint>>;

/// Splits each composition-level flow into one flow per nuclide, weighted by
/// its mass fraction.
///
/// Flows whose composition is unknown contribute nothing.
pub fn isotope_transactions(
    resources: &[ResourceFlow],
    compositions: &[CompositionRow],
) -> IsotopeTransactions {
    let mut by_qual: HashMap<QualId, Vec<&CompositionRow>> = HashMap::new();
    for row in compositions {
        by_qual.entry(row.qual_id).or_default().push(row);
    }

    let mut transactions = IsotopeTransactions::new();
    for flow in resources {
        let Some(rows) = by_qual.get(&flow.qual_id) else {
            continue;
        };
        for row in rows {
            transactions
                .entry(row.nuc_id)
                .or_default()
                .push(TimePoint::new(flow.time, flow.quantity * row.mass_frac));
        }
    }
    transactions
}

/// Regroups already weighted `(time, mass, nucid)` query rows by nuclide.
pub fn isotope_points_to_transactions(points: &[IsotopePoint]) -> IsotopeTransactions {
    let mut transactions = IsotopeTransactions::new();
    for point in points {
        transactions
            .entry(point.nuc_id)
            .or_default()
            .push(TimePoint::new(point.time, point.mass));
    }
    transactions
}

/// Dense series per isotope, keyed by canonical nuclide name in nucid order.
pub fn isotope_timeseries(
    transactions: &IsotopeTransactions,
    duration: usize,
    unit: MassUnit,
    cumulative: bool,
) -> SeriesMap {
    transactions
        .iter()
        .map(|(nuc_id, points)| {
            let values = if cumulative {
                dense::timeseries_cum(points, duration, unit)
            } else {
                dense::timeseries(points, duration, unit)
            };
            (name_of(*nuc_id), values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{isotope_points_to_transactions, isotope_timeseries, isotope_transactions};
    use crate::model::material::{CompositionRow, IsotopePoint, ResourceFlow};
    use crate::series::MassUnit;

    fn compositions() -> Vec<CompositionRow> {
        vec![
            CompositionRow {
                qual_id: 1,
                nuc_id: 922350000,
                mass_frac: 0.05,
            },
            CompositionRow {
                qual_id: 1,
                nuc_id: 922380000,
                mass_frac: 0.95,
            },
            CompositionRow {
                qual_id: 2,
                nuc_id: 942390000,
                mass_frac: 1.0,
            },
        ]
    }

    #[test]
    fn unit_fractions_reproduce_flow_quantity() {
        let flows = vec![ResourceFlow {
            time: 3,
            quantity: 200.0,
            qual_id: 1,
        }];
        let split = isotope_transactions(&flows, &compositions());

        let total: f64 = split
            .values()
            .flat_map(|points| points.iter().map(|point| point.value))
            .sum();
        assert!((total - 200.0).abs() < 1e-9);
        assert_eq!(split.keys().copied().collect::<Vec<_>>(), vec![922350000, 922380000]);
    }

    #[test]
    fn unknown_composition_is_skipped() {
        let flows = vec![ResourceFlow {
            time: 0,
            quantity: 10.0,
            qual_id: 42,
        }];
        assert!(isotope_transactions(&flows, &compositions()).is_empty());
    }

    #[test]
    fn isotope_series_use_nuclide_names() {
        let points = vec![
            IsotopePoint {
                time: 0,
                nuc_id: 942390000,
                mass: 2.0,
            },
            IsotopePoint {
                time: 1,
                nuc_id: 922350000,
                mass: 1.0,
            },
            IsotopePoint {
                time: 2,
                nuc_id: 942390000,
                mass: 3.0,
            },
        ];
        let series = isotope_timeseries(
            &isotope_points_to_transactions(&points),
            3,
            MassUnit::Kilograms,
            true,
        );

        assert_eq!(series.keys().collect::<Vec<_>>(), vec!["U235", "Pu239"]);
        assert_eq!(series.get("U235"), Some(&[0.0, 1.0, 1.0][..]));
        assert_eq!(series.get("Pu239"), Some(&[2.0, 2.0, 5.0][..]));
    }
}
