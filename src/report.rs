use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

use csv::Writer;
use log::debug;
use serde::Serialize;

use crate::error::SimError;

/// Writes serializable rows to a CSV file, one row per `send`. The header is taken from the
/// field names of the first row.
pub struct ReportWriter {
    writer: Writer<File>,
    rows: usize,
}

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist. Returns the file if successful.
fn generate_validate_filepath(path: &Path) -> Result<File, SimError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(SimError::ReportError(
            "Report output files must be CSVs at this time".to_string(),
        )),
    }
}

impl ReportWriter {
    /// Creates (or truncates) the report file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::ReportError` if `path` does not end in `.csv`, or an I/O error if the
    /// file or its parent directories cannot be created.
    pub fn create(path: &Path) -> Result<Self, SimError> {
        let file = generate_validate_filepath(path)?;
        debug!("writing report to {}", path.display());
        Ok(ReportWriter {
            writer: Writer::from_writer(file),
            rows: 0,
        })
    }

    /// Writes one row and flushes it to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be serialized or written.
    pub fn send<T: Serialize>(&mut self, row: &T) -> Result<(), SimError> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Number of rows written so far.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_derive::Deserialize;
    use tempfile::tempdir;

    #[derive(Serialize, Deserialize)]
    struct SampleReport {
        id: u32,
        value: String,
    }

    #[test]
    fn add_and_send_report() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("sample_report.csv");
        let mut report = ReportWriter::create(&file_path).unwrap();
        report
            .send(&SampleReport {
                id: 1,
                value: "Test Value".to_string(),
            })
            .unwrap();
        assert_eq!(report.rows(), 1);

        assert!(file_path.exists(), "CSV file should exist");
        let mut reader = csv::Reader::from_path(file_path).unwrap();
        let records: Vec<SampleReport> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].value, "Test Value");
    }

    #[test]
    fn directory_creation_writing_works() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test-temp").join("sample_report.csv");
        let mut report = ReportWriter::create(&file_path).unwrap();
        for id in 0..3 {
            report
                .send(&SampleReport {
                    id,
                    value: format!("row {id}"),
                })
                .unwrap();
        }

        let mut reader = csv::Reader::from_path(file_path).unwrap();
        let ids: Vec<u32> = reader
            .deserialize::<SampleReport>()
            .map(|record| record.unwrap().id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn only_csvs_allowed() {
        let temp_dir = tempdir().unwrap();
        let result = ReportWriter::create(&temp_dir.path().join("sample_report.tsv"));
        match result {
            Err(SimError::ReportError(message)) => {
                assert_eq!(message, "Report output files must be CSVs at this time");
            }
            _ => panic!("Expected a report error"),
        }
    }
}
