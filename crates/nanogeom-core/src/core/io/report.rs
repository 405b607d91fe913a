use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// One row of a distance report: a requested separation and what was reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub target: f64,
    pub achieved: f64,
    pub deviation: f64,
}

impl DistanceRecord {
    pub fn new(target: f64, achieved: f64) -> Self {
        Self {
            target,
            achieved,
            deviation: achieved - target,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("CSV error: {0}")]
    Stream(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes `records` as CSV with a `target,achieved,deviation` header.
pub fn write_distance_report<W: Write>(
    writer: W,
    records: &[DistanceRecord],
) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_distance_report_path(path: &Path, records: &[DistanceRecord]) -> Result<(), ReportError> {
    let csv_err = |e: csv::Error| ReportError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for record in records {
        csv_writer.serialize(record).map_err(csv_err)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn read_distance_report(path: &Path) -> Result<Vec<DistanceRecord>, ReportError> {
    let csv_err = |e: csv::Error| ReportError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    reader
        .deserialize::<DistanceRecord>()
        .map(|row| row.map_err(csv_err))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_header_and_rows() {
        let mut buffer = Vec::new();
        write_distance_report(
            &mut buffer,
            &[DistanceRecord::new(10.0, 9.995), DistanceRecord::new(20.0, 19.99)],
        )
        .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("target,achieved,deviation"));
        assert!(lines.next().unwrap().starts_with("10.0,9.995,"));
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn file_report_can_be_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("distances.csv");
        let records = vec![DistanceRecord::new(5.0, 4.992), DistanceRecord::new(7.5, 7.499)];
        write_distance_report_path(&path, &records).unwrap();

        let loaded = read_distance_report(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].target, 5.0);
        assert!((loaded[1].deviation - (7.499 - 7.5)).abs() < 1e-12);
    }

    #[test]
    fn missing_report_is_a_csv_error_with_path() {
        let result = read_distance_report(Path::new("/nonexistent/report.csv"));
        match result {
            Err(ReportError::Csv { path, .. }) => assert!(path.ends_with("report.csv")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
