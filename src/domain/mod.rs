//! Domain models and types for Sluice.
//!
//! This module contains the domain models and types that flow through an
//! ingestion run.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`RunId`], [`SourceKey`])
//! - **Row and record models** ([`Row`], [`Record`], [`RecordKey`])
//! - **Audit models** ([`Detail`], [`FieldViolation`], [`SummaryResult`])
//! - **Error types** ([`SluiceError`], [`WriteError`], [`WriteErrorKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! ```rust
//! use sluice::domain::{RunId, SourceKey};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let run_id = RunId::new("R-2025-000123")?;
//! let source_key = SourceKey::new("uploads/members.csv")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Store failures are structured so callers branch on the kind:
//!
//! ```rust
//! use sluice::domain::{SluiceError, WriteError, WriteErrorKind};
//!
//! let err: SluiceError = WriteError::duplicate("records", "key exists").into();
//! assert_eq!(err.write_kind(), Some(WriteErrorKind::DuplicateKey));
//! ```

pub mod detail;
pub mod errors;
pub mod ids;
pub mod record;
pub mod result;
pub mod row;
pub mod summary;

// Re-export commonly used types for convenience
pub use detail::{Detail, FieldViolation, ProcessStatus, RuleKind};
pub use errors::{SluiceError, WriteError, WriteErrorKind};
pub use ids::{RunId, SourceKey};
pub use record::{Record, RecordKey};
pub use result::Result;
pub use row::Row;
pub use summary::SummaryResult;
