//! Ingestion orchestration
//!
//! This module provides the per-run ingestion logic:
//! - Building records and audit details from rows
//! - Accumulating them into bounded batches
//! - Coordinating download, streaming, flushing and the final summary
//! - Reporting what a run did

pub mod batch;
pub mod builder;
pub mod coordinator;
pub mod summary;

pub use batch::{Batch, BatchAccumulator};
pub use builder::{RowBuilder, RowOutcome};
pub use coordinator::{IngestCoordinator, IngestSettings, RunAbort, RunPhase};
pub use summary::{IngestIssue, IngestIssueType, RunOutcome, RunReport};
