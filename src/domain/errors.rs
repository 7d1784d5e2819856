//! Domain error types
//!
//! This module defines the error hierarchy for Sluice.
//! All errors are domain-specific and don't expose third-party types.

use std::fmt;
use thiserror::Error;

/// Main Sluice error type
///
/// This is the primary error type used throughout the application.
/// Store write failures are carried as a structured [`WriteError`] so callers
/// can branch on [`WriteErrorKind`] instead of inspecting messages.
#[derive(Debug, Error)]
pub enum SluiceError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Source file could not be downloaded or opened
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Atomic write against the backing store failed
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// Database-related errors (connection, migration, queries)
    #[error("Database error: {0}")]
    Database(String),

    /// Checkpoint management errors
    #[error("State management error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl SluiceError {
    /// Returns the write failure kind if this error came from the atomic writer
    pub fn write_kind(&self) -> Option<WriteErrorKind> {
        match self {
            SluiceError::Write(err) => Some(err.kind),
            _ => None,
        }
    }
}

/// Classification of atomic write failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteErrorKind {
    /// Batch was empty or exceeded the per-transaction item ceiling
    ConstraintExceeded,
    /// A conditional check failed because an item key already exists
    DuplicateKey,
    /// The write failed for any other reason
    TransientWriteFailure,
}

impl fmt::Display for WriteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteErrorKind::ConstraintExceeded => "constraint exceeded",
            WriteErrorKind::DuplicateKey => "duplicate key",
            WriteErrorKind::TransientWriteFailure => "transient write failure",
        };
        f.write_str(name)
    }
}

/// Failure of a single all-or-nothing write
///
/// Carries the failure kind plus the table the failure is attributed to.
/// When the failing item cannot be pinned to one table, `table` names the
/// whole group (see [`WriteError::ALL_TABLES`]).
#[derive(Debug, Clone, Error)]
#[error("{kind} on {table}: {message}")]
pub struct WriteError {
    /// Kind of failure
    pub kind: WriteErrorKind,

    /// Table (or table group) the failure relates to
    pub table: &'static str,

    /// Human readable detail
    pub message: String,
}

impl WriteError {
    /// Table group name used when a failure spans several tables
    pub const ALL_TABLES: &'static str = "records/run_summaries/row_details";

    /// Creates a new write error
    pub fn new(kind: WriteErrorKind, table: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            table,
            message: message.into(),
        }
    }

    /// Creates a constraint error (empty or oversized batch)
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new(WriteErrorKind::ConstraintExceeded, Self::ALL_TABLES, message)
    }

    /// Creates a duplicate key error for the given table
    pub fn duplicate(table: &'static str, message: impl Into<String>) -> Self {
        Self::new(WriteErrorKind::DuplicateKey, table, message)
    }

    /// Creates a transient failure for the given table
    pub fn transient(table: &'static str, message: impl Into<String>) -> Self {
        Self::new(WriteErrorKind::TransientWriteFailure, table, message)
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SluiceError {
    fn from(err: std::io::Error) -> Self {
        SluiceError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SluiceError {
    fn from(err: serde_json::Error) -> Self {
        SluiceError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SluiceError {
    fn from(err: toml::de::Error) -> Self {
        SluiceError::Configuration(format!("TOML parse error: {err}"))
    }
}
