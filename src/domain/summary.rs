//! Run summary model
//!
//! One [`SummaryResult`] is written per run, after every detail of the run has
//! been attempted.

use super::detail::ProcessStatus;
use super::ids::{RunId, SourceKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate outcome of an ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Insurer number of the first valid record of the run, if any
    pub first_record_key: Option<String>,

    /// Run identifier
    pub run_id: RunId,

    /// Source file the run ingested
    pub source_key: SourceKey,

    /// `success` when no row failed, `error` otherwise
    pub status: ProcessStatus,

    /// Error message when rows failed
    pub error_message: Option<String>,

    /// Cumulative successful rows
    pub success_count: u64,

    /// Cumulative failed rows
    pub failure_count: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl SummaryResult {
    /// Builds a summary from cumulative counts
    pub fn new(
        first_record_key: Option<String>,
        run_id: RunId,
        source_key: SourceKey,
        success_count: u64,
        failure_count: u64,
    ) -> Self {
        let (status, error_message) = if failure_count > 0 {
            (
                ProcessStatus::Error,
                Some(format!("error count: {failure_count}")),
            )
        } else {
            (ProcessStatus::Success, None)
        };

        Self {
            first_record_key,
            run_id,
            source_key,
            status,
            error_message,
            success_count,
            failure_count,
            created_at: Utc::now(),
        }
    }
}
