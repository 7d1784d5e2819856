//! Row streams over a local file
//!
//! A [`RowStream`] is a lazy, finite, non-restartable sequence of
//! `Result<fields, RowReadError>`. A per-row error does not end the stream;
//! the next call yields the following row.

pub mod csv_source;

pub use csv_source::CsvRowSource;

use crate::domain::Result;
use std::path::Path;
use thiserror::Error;

/// A row the underlying reader could not decode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RowReadError {
    /// Reader-provided description
    pub message: String,
}

impl RowReadError {
    /// Creates a read error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Item yielded by a row stream
pub type RowItem = std::result::Result<Vec<String>, RowReadError>;

/// Lazy sequence of raw rows
pub struct RowStream {
    inner: Box<dyn Iterator<Item = RowItem> + Send>,
}

impl RowStream {
    /// Wraps an iterator
    pub fn new(inner: impl Iterator<Item = RowItem> + Send + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Consumes up to `n` rows, returning how many were actually skipped
    ///
    /// Rows that fail to read still count as skipped rows.
    pub fn skip_rows(&mut self, n: u64) -> u64 {
        let mut skipped = 0;
        while skipped < n && self.inner.next().is_some() {
            skipped += 1;
        }
        skipped
    }
}

impl Iterator for RowStream {
    type Item = RowItem;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Opens row streams over local files
pub trait RowSource: Send + Sync {
    /// Opens `path` as a row stream
    ///
    /// # Errors
    ///
    /// Returns `SourceUnavailable` when the file cannot be opened.
    fn open(&self, path: &Path) -> Result<RowStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(n: usize) -> RowStream {
        RowStream::new((1..=n).map(|i| Ok(vec![i.to_string()])))
    }

    #[test]
    fn test_skip_rows() {
        let mut rows = stream(5);
        assert_eq!(rows.skip_rows(2), 2);
        assert_eq!(rows.next(), Some(Ok(vec!["3".to_string()])));
    }

    #[test]
    fn test_skip_past_end() {
        let mut rows = stream(3);
        assert_eq!(rows.skip_rows(10), 3);
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_errors_do_not_end_stream() {
        let items: Vec<RowItem> = vec![
            Ok(vec!["a".to_string()]),
            Err(RowReadError::new("bad bytes")),
            Ok(vec!["c".to_string()]),
        ];
        let rows: Vec<RowItem> = RowStream::new(items.into_iter()).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].is_err());
    }
}
