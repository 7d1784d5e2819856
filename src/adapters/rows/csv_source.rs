//! Delimited file reader built on the `csv` crate

use super::{RowItem, RowReadError, RowSource, RowStream};
use crate::config::CsvConfig;
use crate::domain::errors::SluiceError;
use crate::domain::Result;
use csv::{ByteRecord, ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::Path;

/// Opens delimited files as row streams
#[derive(Debug, Clone, Copy)]
pub struct CsvRowSource {
    delimiter: u8,
    has_headers: bool,
}

impl CsvRowSource {
    /// Creates a reader for the given delimiter
    pub fn new(delimiter: u8, has_headers: bool) -> Self {
        Self {
            delimiter,
            has_headers,
        }
    }

    /// Creates a reader from the `[source.csv]` section
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a multi-character delimiter.
    pub fn from_config(config: &CsvConfig) -> Result<Self> {
        let delimiter = config
            .delimiter_byte()
            .map_err(SluiceError::Configuration)?;
        Ok(Self::new(delimiter, config.has_headers))
    }
}

impl Default for CsvRowSource {
    fn default() -> Self {
        Self::new(b',', true)
    }
}

impl RowSource for CsvRowSource {
    fn open(&self, path: &Path) -> Result<RowStream> {
        let file = File::open(path).map_err(|e| {
            SluiceError::SourceUnavailable(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .flexible(true)
            .from_reader(file);

        Ok(RowStream::new(CsvRows {
            reader,
            record: ByteRecord::new(),
            finished: false,
        }))
    }
}

struct CsvRows {
    reader: csv::Reader<File>,
    record: ByteRecord,
    finished: bool,
}

impl Iterator for CsvRows {
    type Item = RowItem;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.reader.read_byte_record(&mut self.record) {
            Ok(false) => {
                self.finished = true;
                None
            }
            Ok(true) => Some(
                StringRecord::from_byte_record(self.record.clone())
                    .map(|record| record.iter().map(str::to_string).collect())
                    .map_err(|e| RowReadError::new(e.utf8_error().to_string())),
            ),
            Err(e) => {
                // An I/O failure leaves the reader position undefined
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    self.finished = true;
                }
                Some(Err(RowReadError::new(e.to_string())))
            }
        }
    }
}
