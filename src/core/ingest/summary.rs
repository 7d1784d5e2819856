//! Run reporting
//!
//! Structures describing what one ingestion invocation did.

use crate::core::state::run_state::RunState;
use std::fmt;
use std::time::Duration;

/// How an invocation ended without a fatal error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every row was processed and the summary was written
    Completed,

    /// The checkpoint was already complete; nothing was written
    AlreadyCompleted,

    /// Cancellation stopped the run before the summary was written
    Interrupted,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunOutcome::Completed => "completed",
            RunOutcome::AlreadyCompleted => "already_completed",
            RunOutcome::Interrupted => "interrupted",
        };
        write!(f, "{s}")
    }
}

/// Report of one ingestion invocation
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Checkpoint as it stands at the end of the invocation
    pub state: RunState,

    /// How the invocation ended
    pub outcome: RunOutcome,

    /// Rows read during this invocation
    pub rows_processed: u64,

    /// Intermediate flushes performed
    pub batches_flushed: usize,

    /// Details downgraded after failed record writes
    pub degraded_details: u64,

    /// Duration of the invocation
    pub duration: Duration,

    /// Non-fatal write failures
    pub issues: Vec<IngestIssue>,
}

impl RunReport {
    /// Creates an empty report for `state`
    pub fn new(state: RunState, outcome: RunOutcome) -> Self {
        Self {
            state,
            outcome,
            rows_processed: 0,
            batches_flushed: 0,
            degraded_details: 0,
            duration: Duration::from_secs(0),
            issues: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a non-fatal issue
    pub fn add_issue(&mut self, issue: IngestIssue) {
        self.issues.push(issue);
    }

    /// True when the run completed without any failed row or write
    pub fn is_successful(&self) -> bool {
        self.outcome != RunOutcome::Interrupted
            && self.state.failure_count == 0
            && self.issues.is_empty()
    }

    /// Percentage of rows that produced a stored record, over the whole run
    pub fn success_rate(&self) -> f64 {
        let total = self.state.rows_processed();
        if total == 0 {
            return 100.0;
        }
        (self.state.success_count as f64 / total as f64) * 100.0
    }

    /// Log the report
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.state.run_id,
            outcome = %self.outcome,
            rows_processed = self.rows_processed,
            success = self.state.success_count,
            failure = self.state.failure_count,
            next_row = self.state.next_row,
            batches_flushed = self.batches_flushed,
            degraded_details = self.degraded_details,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Ingestion finished"
        );

        if !self.issues.is_empty() {
            tracing::warn!(
                issue_count = self.issues.len(),
                "Ingestion finished with write failures"
            );
            for issue in &self.issues {
                tracing::warn!(
                    issue_type = ?issue.issue_type,
                    message = %issue.message,
                    context = issue.context.as_deref().unwrap_or(""),
                    "Write failure"
                );
            }
        }
    }
}

/// Non-fatal failure recorded during a run
#[derive(Debug, Clone)]
pub struct IngestIssue {
    /// Which write failed
    pub issue_type: IngestIssueType,

    /// Error message
    pub message: String,

    /// Additional context
    pub context: Option<String>,
}

impl IngestIssue {
    /// Create a new issue
    pub fn new(issue_type: IngestIssueType, message: String) -> Self {
        Self {
            issue_type,
            message,
            context: None,
        }
    }

    /// Add context to the issue
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}

/// Kind of write that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestIssueType {
    /// Records of an intermediate batch were not stored
    RecordWrite,

    /// Details of an intermediate batch were not stored
    DetailWrite,
}
