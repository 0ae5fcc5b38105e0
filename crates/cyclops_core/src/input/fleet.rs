use super::{InputError, InputResult};
use crate::model::nuclide::Nuclide;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::path::Path;

/// One row of a fleet table: `Country, Reactor Name, Type,
/// Net Electric Capacity, Operator`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FleetRecord {
    pub country: String,
    pub reactor_name: String,
    pub reactor_type: String,
    /// MWe.
    pub net_capacity: f64,
    pub operator: String,
}

/// One row of a headerless reactor list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReactorListRow {
    pub country: String,
    pub reactor_name: String,
    pub capacity: i64,
    pub n_assem_core: i64,
    pub n_assem_batch: i64,
}

/// Reads a fleet table. The first row is skipped whatever its content and
/// columns are taken by position.
pub fn read_fleet_csv(path: &Path) -> InputResult<Vec<FleetRecord>> {
    read_rows(path, true)
}

/// Reads `country,reactor_name,capacity,n_assem_core,n_assem_batch` rows.
pub fn read_reactor_list(path: &Path) -> InputResult<Vec<ReactorListRow>> {
    read_rows(path, false)
}

/// Reads headerless `nuclide,mass_frac` rows as parallel id and
/// composition lists.
///
/// Ids are kept as written but must parse as a nuclide name or nucid.
pub fn read_recipe_csv(path: &Path) -> InputResult<(Vec<String>, Vec<f64>)> {
    let rows: Vec<(String, f64)> = read_rows(path, false)?;
    for (id, _) in &rows {
        id.parse::<Nuclide>().map_err(|source| InputError::Nuclide {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(rows.into_iter().unzip())
}

fn read_rows<T>(path: &Path, skip_header: bool) -> InputResult<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(skip_header)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|err| InputError::csv(path, err))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| InputError::csv(path, err))?;
        let row = record
            .deserialize(None)
            .map_err(|err| InputError::csv(path, err))?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::{read_fleet_csv, read_reactor_list, read_recipe_csv, FleetRecord, ReactorListRow};
    use crate::input::InputError;
    use tempfile::TempDir;

    #[test]
    fn fleet_header_is_skipped_and_columns_are_positional() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fleet.csv");
        std::fs::write(
            &path,
            "Land,Name,Kind,MWe,Owner\nUSA, Vogtle 1,PWR,1109,Southern\nUSA,Hatch 1,BWR,876.5,Southern\n",
        )
        .unwrap();

        let rows = read_fleet_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            FleetRecord {
                country: "USA".to_string(),
                reactor_name: "Vogtle 1".to_string(),
                reactor_type: "PWR".to_string(),
                net_capacity: 1109.0,
                operator: "Southern".to_string(),
            }
        );
        assert_eq!(rows[1].net_capacity, 876.5);
    }

    #[test]
    fn reactor_list_has_no_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.csv");
        std::fs::write(&path, "France,Flamanville,1330,157,52\n").unwrap();

        assert_eq!(
            read_reactor_list(&path).unwrap(),
            vec![ReactorListRow {
                country: "France".to_string(),
                reactor_name: "Flamanville".to_string(),
                capacity: 1330,
                n_assem_core: 157,
                n_assem_batch: 52,
            }]
        );
    }

    #[test]
    fn non_numeric_capacity_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.csv");
        std::fs::write(&path, "France,Flamanville,big,157,52\n").unwrap();

        assert!(matches!(
            read_reactor_list(&path).unwrap_err(),
            InputError::Csv { .. }
        ));
    }

    #[test]
    fn recipe_rows_split_into_ids_and_fractions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.csv");
        std::fs::write(&path, "U235, 0.04\nU238,0.96\n").unwrap();

        let (ids, comps) = read_recipe_csv(&path).unwrap();
        assert_eq!(ids, vec!["U235", "U238"]);
        assert_eq!(comps, vec![0.04, 0.96]);
    }

    #[test]
    fn recipe_ids_must_be_nuclides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spent.csv");
        std::fs::write(&path, "942390000,0.01
fuel,0.99
").unwrap();

        let err = read_recipe_csv(&path).unwrap_err();
        assert!(matches!(err, InputError::Nuclide { .. }));
        assert!(err.to_string().contains("fuel"));
    }
}
