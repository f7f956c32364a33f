//! Streaming CSV loaders.
//!
//! Rows are read one at a time and handed out as header-keyed maps. Ragged rows
//! are not rejected: missing trailing fields are simply absent, surplus fields
//! are keyed `_<index>`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::ReconError;
use crate::model::RawRecord;

const BOM: char = '\u{feff}';

/// Iterator over the data rows of one delimited file.
pub struct RecordReader<R: Read> {
    path: PathBuf,
    headers: Vec<String>,
    records: csv::StringRecordsIntoIter<R>,
}

impl RecordReader<BufReader<File>> {
    /// Open `path` and read its header row.
    pub fn open(path: &Path, delimiter: u8) -> Result<Self, ReconError> {
        let file = File::open(path).map_err(|source| ReconError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(path, BufReader::new(file), delimiter)
    }
}

impl<R: Read> RecordReader<R> {
    /// Wrap any reader. `path` is only used in error messages.
    pub fn from_reader(path: &Path, reader: R, delimiter: u8) -> Result<Self, ReconError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| ReconError::csv(path, e))?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches(BOM).to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            records: csv_reader.into_records(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn to_raw(&self, record: &csv::StringRecord) -> RawRecord {
        record
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let key = self.headers.get(i).cloned().unwrap_or_else(|| format!("_{i}"));
                (key, value.to_string())
            })
            .collect()
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<RawRecord, ReconError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(
            record
                .map(|r| self.to_raw(&r))
                .map_err(|e| ReconError::csv(&self.path, e)),
        )
    }
}

/// Read every data row of `path`, preserving file order.
pub fn load_records(path: &Path, delimiter: u8) -> Result<Vec<RawRecord>, ReconError> {
    let reader = RecordReader::open(path, delimiter)?;
    let rows = reader.collect::<Result<Vec<_>, _>>()?;
    log::info!("read {} records from {}", rows.len(), path.display());
    Ok(rows)
}

/// Same as [`load_records`] for in-memory or already-open input.
pub fn read_records<R: Read>(
    label: &Path,
    reader: R,
    delimiter: u8,
) -> Result<Vec<RawRecord>, ReconError> {
    RecordReader::from_reader(label, reader, delimiter)?.collect()
}
