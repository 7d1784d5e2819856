//! Ingest coordinator - drives one run from download to summary
//!
//! The coordinator stages the source file in a scratch directory, skips the
//! rows a previous invocation already counted, then streams the rest through
//! validation and the batch accumulator. Intermediate flush failures degrade
//! the affected rows and the run carries on; failures of the final flush or of
//! the summary write abort the run with the checkpoint left incomplete.

use super::batch::{Batch, BatchAccumulator};
use super::builder::RowBuilder;
use super::summary::{IngestIssue, IngestIssueType, RunOutcome, RunReport};
use crate::adapters::database::traits::AtomicWriter;
use crate::adapters::rows::RowSource;
use crate::adapters::source::SourceStorage;
use crate::config::IngestConfig;
use crate::core::state::{ResumeDecision, RunState};
use crate::core::validation::RowSchema;
use crate::domain::errors::{WriteError, WriteErrorKind};
use crate::domain::ids::SourceKey;
use crate::domain::{SluiceError, SummaryResult};
use crate::{log_run_complete, log_run_start};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::watch;

/// Phase of a run, used in logs and abort reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Staging the source file and skipping counted rows
    NotStarted,
    /// Reading rows and flushing full batches
    Streaming,
    /// Flushing the last partial batch
    Draining,
    /// Writing the run summary
    Finalizing,
    /// Summary written, checkpoint marked complete
    Completed,
    /// Stopped by a fatal error
    Aborted,
    /// Stopped by cancellation before the summary
    Interrupted,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::NotStarted => "not_started",
            RunPhase::Streaming => "streaming",
            RunPhase::Draining => "draining",
            RunPhase::Finalizing => "finalizing",
            RunPhase::Completed => "completed",
            RunPhase::Aborted => "aborted",
            RunPhase::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

/// Fatal failure of a run
///
/// Carries the checkpoint as it stood when the run stopped, so the caller can
/// persist it and retry later.
#[derive(Debug, Error)]
#[error("run {} aborted during {phase}: {error}", state.run_id)]
pub struct RunAbort {
    /// Checkpoint at the time of the abort, never marked completed
    pub state: RunState,

    /// Phase that was running when the failure happened
    pub phase: RunPhase,

    /// Underlying error
    #[source]
    pub error: SluiceError,
}

/// Per-run settings
#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// Key of the file to ingest
    pub source_key: SourceKey,

    /// Number of buffered details that triggers a flush
    pub batch_ceiling: usize,

    /// Write the summary even after cancellation
    pub finalize_on_cancel: bool,

    /// Row validation rules
    pub schema: RowSchema,
}

impl IngestSettings {
    /// Builds settings from the `[ingest]` section
    pub fn from_config(config: &IngestConfig, source_key: SourceKey) -> Self {
        Self {
            source_key,
            batch_ceiling: config.batch_ceiling,
            finalize_on_cancel: config.finalize_on_cancel,
            schema: RowSchema::standard(),
        }
    }
}

/// Ingest coordinator
pub struct IngestCoordinator {
    settings: IngestSettings,
    source: Arc<dyn SourceStorage>,
    rows: Arc<dyn RowSource>,
    writer: Arc<dyn AtomicWriter>,
}

impl IngestCoordinator {
    /// Create a new ingest coordinator
    pub fn new(
        settings: IngestSettings,
        source: Arc<dyn SourceStorage>,
        rows: Arc<dyn RowSource>,
        writer: Arc<dyn AtomicWriter>,
    ) -> Self {
        Self {
            settings,
            source,
            rows,
            writer,
        }
    }

    /// Execute one invocation of the run described by `state`
    ///
    /// Returns the report with the updated checkpoint. A completed checkpoint
    /// returns immediately without touching the source or the store.
    /// Cancellation is observed once per row and only while unread rows
    /// remain. The buffered rows are flushed and the run finalizes; with
    /// `finalize_on_cancel` cleared it stops after the flush as
    /// [`RunOutcome::Interrupted`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`RunAbort`] when the source cannot be staged, the final flush
    /// fails, or the summary cannot be written.
    pub async fn run(
        &self,
        state: RunState,
        cancel: watch::Receiver<bool>,
    ) -> std::result::Result<RunReport, RunAbort> {
        let start_time = Instant::now();

        let (skip, first_ordinal) = match ResumeDecision::for_state(&state) {
            ResumeDecision::AlreadyCompleted => {
                tracing::info!(
                    run_id = %state.run_id,
                    "Run already completed - nothing to do"
                );
                return Ok(RunReport::new(state, RunOutcome::AlreadyCompleted)
                    .with_duration(start_time.elapsed()));
            }
            ResumeDecision::Resume {
                skip,
                first_ordinal,
            } => (skip, first_ordinal),
        };

        let mut state = state;
        state.next_row = first_ordinal;
        log_run_start!(state.run_id, self.settings.source_key, first_ordinal);

        // Setup: the scratch directory is removed when `scratch` drops
        let scratch = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => return Err(abort(state, RunPhase::NotStarted, e.into())),
        };
        let local_path = scratch.path().join(self.settings.source_key.file_name());

        if let Err(e) = self
            .source
            .download(&local_path, &self.settings.source_key)
            .await
        {
            return Err(abort(state, RunPhase::NotStarted, e));
        }

        let mut rows = match self.rows.open(&local_path) {
            Ok(rows) => rows,
            Err(e) => return Err(abort(state, RunPhase::NotStarted, e)),
        };

        let skipped = rows.skip_rows(skip);
        if skipped < skip {
            tracing::warn!(
                run_id = %state.run_id,
                expected = skip,
                skipped,
                "Source has fewer rows than the checkpoint already covers"
            );
        }

        // Streaming
        enter(&state, RunPhase::Streaming);
        let builder = RowBuilder::new(self.settings.schema.clone(), state.run_id.clone());
        let mut report = RunReport::new(state.clone(), RunOutcome::Completed);
        let mut accumulator = BatchAccumulator::new(self.settings.batch_ceiling);
        let mut rows = rows.peekable();
        let mut cancelled = false;

        loop {
            // A peeked row stays buffered whole and uncounted until `next`
            if rows.peek().is_none() {
                break;
            }
            if *cancel.borrow() {
                tracing::warn!(
                    run_id = %state.run_id,
                    next_row = state.next_row,
                    "Cancellation requested - draining buffered rows"
                );
                cancelled = true;
                break;
            }

            let Some(item) = rows.next() else {
                break;
            };

            let outcome = builder.build(state.next_row, item);
            outcome.apply_to(&mut state);
            accumulator = accumulator.push(outcome);
            state.next_row += 1;
            report.rows_processed += 1;

            if accumulator.is_full() {
                let (batch, fresh) = accumulator.take_batch();
                accumulator = fresh;
                if let Err(e) = self.flush_intermediate(batch, &mut state, &mut report).await {
                    return Err(abort(state, RunPhase::Streaming, e));
                }
            }
        }

        // Draining
        enter(&state, RunPhase::Draining);
        let summary = SummaryResult::new(
            state.first_record_key.clone(),
            state.run_id.clone(),
            self.settings.source_key.clone(),
            state.success_count,
            state.failure_count,
        );

        let (batch, _) = accumulator.take_batch();
        if let Err(e) = self.flush_final(batch).await {
            return Err(abort(state, RunPhase::Draining, e));
        }

        if cancelled && !self.settings.finalize_on_cancel {
            state.touch();
            enter(&state, RunPhase::Interrupted);
            report.state = state;
            report.outcome = RunOutcome::Interrupted;
            let report = report.with_duration(start_time.elapsed());
            report.log_summary();
            return Ok(report);
        }

        // Finalizing
        enter(&state, RunPhase::Finalizing);
        if let Err(e) = self.writer.transact_put(&[], Some(&summary), &[]).await {
            tracing::error!(
                run_id = %state.run_id,
                error = %e,
                "Failed to write run summary"
            );
            return Err(abort(state, RunPhase::Finalizing, e.into()));
        }

        state.mark_completed();
        enter(&state, RunPhase::Completed);
        let duration = start_time.elapsed();
        log_run_complete!(
            state.run_id,
            state.success_count,
            state.failure_count,
            duration
        );

        report.state = state;
        let report = report.with_duration(duration);
        report.log_summary();
        Ok(report)
    }

    /// Flush a full batch, degrading instead of failing
    ///
    /// Records go first. When they fail, every detail backed by one of them is
    /// downgraded and moved from the success to the failure count before the
    /// details are written. A failed detail write is logged and skipped.
    /// Only a constraint violation, which means the batch itself is malformed,
    /// is returned as an error.
    async fn flush_intermediate(
        &self,
        mut batch: Batch,
        state: &mut RunState,
        report: &mut RunReport,
    ) -> crate::domain::Result<()> {
        let rows = match batch.ordinal_range() {
            Some((first, last)) => format!("rows {first}-{last}"),
            None => return Ok(()),
        };

        if !batch.records.is_empty() {
            if let Err(e) = self.writer.transact_put(&batch.records, None, &[]).await {
                fail_on_constraint(&e)?;

                let degraded = batch.degrade_records(&e);
                state.reclassify_as_failed(degraded);
                report.degraded_details += degraded;

                tracing::warn!(
                    run_id = %state.run_id,
                    kind = %e.kind,
                    degraded,
                    context = %rows,
                    error = %e,
                    "Record write failed - rows downgraded to errors"
                );
                report.add_issue(
                    IngestIssue::new(IngestIssueType::RecordWrite, e.to_string())
                        .with_context(rows.clone()),
                );
            }
        }

        if let Err(e) = self.writer.transact_put(&[], None, &batch.details).await {
            fail_on_constraint(&e)?;

            tracing::warn!(
                run_id = %state.run_id,
                kind = %e.kind,
                context = %rows,
                error = %e,
                "Detail write failed - audit entries for these rows are missing"
            );
            report.add_issue(
                IngestIssue::new(IngestIssueType::DetailWrite, e.to_string()).with_context(rows),
            );
        }

        report.batches_flushed += 1;
        state.touch();
        Ok(())
    }

    /// Flush the last partial batch; any failure is fatal
    async fn flush_final(&self, batch: Batch) -> crate::domain::Result<()> {
        if !batch.records.is_empty() {
            self.writer.transact_put(&batch.records, None, &[]).await?;
        }
        if !batch.details.is_empty() {
            self.writer.transact_put(&[], None, &batch.details).await?;
        }
        Ok(())
    }
}

fn fail_on_constraint(error: &WriteError) -> crate::domain::Result<()> {
    if error.kind == WriteErrorKind::ConstraintExceeded {
        return Err(error.clone().into());
    }
    Ok(())
}

fn enter(state: &RunState, phase: RunPhase) {
    tracing::debug!(
        run_id = %state.run_id,
        phase = %phase,
        next_row = state.next_row,
        "Entering phase"
    );
}

fn abort(state: RunState, phase: RunPhase, error: SluiceError) -> RunAbort {
    tracing::error!(
        run_id = %state.run_id,
        phase = %phase,
        next_row = state.next_row,
        error = %error,
        "Run aborted"
    );
    enter(&state, RunPhase::Aborted);
    RunAbort {
        state,
        phase,
        error,
    }
}
