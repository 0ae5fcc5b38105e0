//! CSV export of analysis results.
//!
//! # Responsibility
//! - Write column-oriented data as row-oriented CSV.
//!
//! # Invariants
//! - The header has exactly one entry per column.
//! - Every column has the same length.
//! - Existing files at the output path are replaced.

use crate::model::timeline::SimInfo;
use crate::series::SeriesMap;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Csv(csv::Error),
    /// Header and columns disagree in count, or columns in length.
    Shape(String),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
            Self::Shape(message) => write!(f, "malformed export data: {message}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Shape(_) => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Writes `columns` transposed: row `i` holds the `i`-th value of every
/// column, in header order.
pub fn write_csv(path: &Path, header: &[&str], columns: &[Vec<f64>]) -> ExportResult<()> {
    if header.len() != columns.len() {
        return Err(ExportError::Shape(format!(
            "{} header fields for {} columns",
            header.len(),
            columns.len()
        )));
    }
    let rows = columns.first().map_or(0, Vec::len);
    if let Some((index, column)) = columns
        .iter()
        .enumerate()
        .find(|(_, column)| column.len() != rows)
    {
        return Err(ExportError::Shape(format!(
            "column `{}` has {} rows, expected {rows}",
            header[index],
            column.len()
        )));
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for row in 0..rows {
        writer.write_record(columns.iter().map(|column| column[row].to_string()))?;
    }
    writer.flush()?;

    info!(
        "event=csv_write module=export status=ok path={} rows={rows} columns={}",
        path.display(),
        columns.len()
    );
    Ok(())
}

/// Writes `Time,Year,<key>...` with one row per timestep.
pub fn write_series_csv(path: &Path, info: &SimInfo, series: &SeriesMap) -> ExportResult<()> {
    let mut header = vec!["Time", "Year"];
    header.extend(series.keys());

    let mut columns = Vec::with_capacity(series.len() + 2);
    columns.push(info.timesteps().map(|step| step as f64).collect::<Vec<_>>());
    columns.push(info.years());
    columns.extend(series.iter().map(|(_, values)| values.to_vec()));
    write_csv(path, &header, &columns)
}

#[cfg(test)]
mod tests {
    use super::{write_csv, write_series_csv, ExportError};
    use crate::model::timeline::SimInfo;
    use crate::series::SeriesMap;
    use tempfile::TempDir;

    #[test]
    fn columns_are_written_as_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&path, &["a", "b"], &[vec![1.0, 2.0], vec![3.5, 4.0]]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "a,b\n1,3.5\n2,4\n");
    }

    #[test]
    fn existing_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale,data\n9,9\n9,9\n9,9\n").unwrap();
        write_csv(&path, &["x"], &[vec![1.0]]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n1\n");
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let dir = TempDir::new().unwrap();
        let err = write_csv(
            &dir.path().join("bad.csv"),
            &["a", "b"],
            &[vec![1.0, 2.0], vec![3.0]],
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::Shape(_)));

        let err = write_csv(&dir.path().join("bad.csv"), &["a"], &[]).unwrap_err();
        assert!(matches!(err, ExportError::Shape(_)));
    }

    #[test]
    fn series_csv_has_time_and_year_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("series.csv");
        let mut series = SeriesMap::new();
        series.insert("uox", vec![0.0, 1.5, 3.0]);

        write_series_csv(&path, &SimInfo::new(2000, 1, 3), &series).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Time,Year,uox"));
        assert_eq!(lines.next(), Some("0,2000,0"));
        let second = lines.next().unwrap();
        assert!(second.starts_with("1,2000.083"));
        assert!(second.ends_with(",1.5"));
        assert_eq!(lines.count(), 1);
    }
}
