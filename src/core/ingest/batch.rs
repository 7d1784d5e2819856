//! Batch accumulation
//!
//! The accumulator is passed by value: each push consumes it and hands back
//! the updated one, and `take_batch` splits off the buffered items together
//! with a fresh accumulator.

use super::builder::RowOutcome;
use crate::domain::detail::FieldViolation;
use crate::domain::errors::WriteError;
use crate::domain::{Detail, Record};
use std::collections::HashSet;

/// Items flushed together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    /// Records of the valid rows
    pub records: Vec<Record>,

    /// One detail per row
    pub details: Vec<Detail>,
}

impl Batch {
    /// Returns true when there is nothing to write
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.details.is_empty()
    }

    /// First and last row ordinal covered by the batch
    pub fn ordinal_range(&self) -> Option<(u64, u64)> {
        let first = self.details.first()?.row_ordinal;
        let last = self.details.last()?.row_ordinal;
        Some((first, last))
    }

    /// Downgrades the details whose records were lost in a failed write
    ///
    /// Every successful detail whose row has a record in this batch becomes an
    /// error carrying a write violation. The records are dropped. Returns the
    /// number of details that changed.
    pub fn degrade_records(&mut self, cause: &WriteError) -> u64 {
        let lost: HashSet<u64> = self.records.drain(..).map(|r| r.row_ordinal).collect();

        let mut degraded = 0;
        for detail in &mut self.details {
            if lost.contains(&detail.row_ordinal)
                && detail.downgrade(FieldViolation::write_failure(cause))
            {
                degraded += 1;
            }
        }
        degraded
    }
}

/// Buffers outcomes until the detail count reaches the ceiling
#[derive(Debug, Clone)]
pub struct BatchAccumulator {
    batch: Batch,
    ceiling: usize,
}

impl BatchAccumulator {
    /// Creates an empty accumulator
    pub fn new(ceiling: usize) -> Self {
        Self {
            batch: Batch {
                records: Vec::with_capacity(ceiling),
                details: Vec::with_capacity(ceiling),
            },
            ceiling,
        }
    }

    /// Appends a row outcome
    pub fn push(mut self, outcome: RowOutcome) -> Self {
        if let Some(record) = outcome.record {
            self.batch.records.push(record);
        }
        self.batch.details.push(outcome.detail);
        self
    }

    /// True once the detail buffer has reached the ceiling
    pub fn is_full(&self) -> bool {
        self.batch.details.len() >= self.ceiling
    }

    /// True when nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Buffered details
    pub fn detail_count(&self) -> usize {
        self.batch.details.len()
    }

    /// Buffered records
    pub fn record_count(&self) -> usize {
        self.batch.records.len()
    }

    /// Splits off the buffered batch, returning it with an empty accumulator
    pub fn take_batch(self) -> (Batch, BatchAccumulator) {
        let fresh = BatchAccumulator::new(self.ceiling);
        (self.batch, fresh)
    }
}
