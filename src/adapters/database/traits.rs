//! Storage abstraction traits
//!
//! This module defines the seams between the ingestion loop and the stores it
//! writes to: the all-or-nothing [`AtomicWriter`] and the checkpoint
//! [`StateStorage`].

use crate::config::MAX_WRITE_ITEMS;
use crate::core::state::run_state::RunState;
use crate::domain::errors::WriteError;
use crate::domain::ids::RunId;
use crate::domain::{Detail, Record, Result, SummaryResult};
use async_trait::async_trait;

/// Item counts of one atomic write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteBatchBounds {
    /// Records in the write
    pub records: usize,
    /// 1 when a summary is included
    pub summaries: usize,
    /// Details in the write
    pub details: usize,
}

impl WriteBatchBounds {
    /// Collects the counts of a prospective write
    pub fn of(records: &[Record], summary: Option<&SummaryResult>, details: &[Detail]) -> Self {
        Self {
            records: records.len(),
            summaries: usize::from(summary.is_some()),
            details: details.len(),
        }
    }

    /// Total item count
    pub fn total(&self) -> usize {
        self.records + self.summaries + self.details
    }

    /// Checks the write against the store's per-transaction limits
    ///
    /// # Errors
    ///
    /// Returns a `ConstraintExceeded` error when the write is empty or larger
    /// than [`MAX_WRITE_ITEMS`].
    pub fn check(&self) -> std::result::Result<(), WriteError> {
        let total = self.total();
        if total == 0 {
            return Err(WriteError::constraint("write contains no items"));
        }
        if total > MAX_WRITE_ITEMS {
            return Err(WriteError::constraint(format!(
                "write contains {} items, limit is {}",
                total, MAX_WRITE_ITEMS
            )));
        }
        Ok(())
    }
}

/// All-or-nothing conditional multi-item writer
///
/// Every item is written only if its key does not exist yet. Either all items
/// of a call are durably written or none are.
#[async_trait]
pub trait AtomicWriter: Send + Sync {
    /// Writes records, an optional summary and details as one transaction
    ///
    /// # Errors
    ///
    /// - `ConstraintExceeded` when the write is empty or too large
    /// - `DuplicateKey` when any item already exists
    /// - `TransientWriteFailure` for every other failure
    async fn transact_put(
        &self,
        records: &[Record],
        summary: Option<&SummaryResult>,
        details: &[Detail],
    ) -> std::result::Result<(), WriteError>;

    /// Short name used in logs
    fn backend_name(&self) -> &'static str;
}

/// State storage trait for checkpoint persistence
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Load a checkpoint
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(RunState))` if found, `Ok(None)` if not found.
    async fn load_run_state(&self, run_id: &RunId) -> Result<Option<RunState>>;

    /// Create or replace a checkpoint
    async fn save_run_state(&self, state: &RunState) -> Result<()>;

    /// List every checkpoint, ordered by run id
    async fn list_run_states(&self) -> Result<Vec<RunState>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::WriteErrorKind;
    use crate::domain::ids::SourceKey;

    fn details(n: usize) -> Vec<Detail> {
        let run_id = RunId::new("R-1").unwrap();
        (1..=n as u64)
            .map(|i| Detail::new(run_id.clone(), i, Vec::new()))
            .collect()
    }

    #[test]
    fn test_empty_write_is_rejected() {
        let err = WriteBatchBounds::of(&[], None, &[]).check().unwrap_err();
        assert_eq!(err.kind, WriteErrorKind::ConstraintExceeded);
    }

    #[test]
    fn test_write_at_limit_is_accepted() {
        let details = details(MAX_WRITE_ITEMS);
        assert!(WriteBatchBounds::of(&[], None, &details).check().is_ok());
    }

    #[test]
    fn test_write_over_limit_is_rejected() {
        let details = details(MAX_WRITE_ITEMS);
        let summary = SummaryResult::new(
            None,
            RunId::new("R-1").unwrap(),
            SourceKey::new("a.csv").unwrap(),
            0,
            0,
        );
        let bounds = WriteBatchBounds::of(&[], Some(&summary), &details);
        assert_eq!(bounds.total(), MAX_WRITE_ITEMS + 1);
        assert_eq!(
            bounds.check().unwrap_err().kind,
            WriteErrorKind::ConstraintExceeded
        );
    }

    #[test]
    fn test_summary_alone_is_accepted() {
        let summary = SummaryResult::new(
            None,
            RunId::new("R-1").unwrap(),
            SourceKey::new("a.csv").unwrap(),
            0,
            0,
        );
        assert!(WriteBatchBounds::of(&[], Some(&summary), &[]).check().is_ok());
    }
}
