//! Per-row audit entries
//!
//! Every processed row produces exactly one [`Detail`], valid or not. The
//! detail records the row's status together with every field violation found.

use super::ids::RunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing status shared by details and run summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    /// Row (or run) processed without errors
    Success,
    /// Row (or run) had at least one error
    Error,
}

impl ProcessStatus {
    /// Returns the persisted string form
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Success => "success",
            ProcessStatus::Error => "error",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule a field violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Value is missing or blank
    Required,
    /// Value is longer than allowed
    MaxLength,
    /// Value is not a calendar date
    Date,
    /// Row could not be read from the source
    Read,
    /// Record backing a successful row could not be written
    Write,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::Required => "required",
            RuleKind::MaxLength => "max_length",
            RuleKind::Date => "date",
            RuleKind::Read => "read",
            RuleKind::Write => "write",
        };
        f.write_str(name)
    }
}

/// One (field, rule, message) violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field name, empty for row-level failures
    pub field: String,

    /// Violated rule
    pub rule: RuleKind,

    /// Human readable message
    pub message: String,
}

impl FieldViolation {
    /// Creates a new violation
    pub fn new(field: impl Into<String>, rule: RuleKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule,
            message: message.into(),
        }
    }

    /// Creates the row-level violation used when the row stream failed
    pub fn read_failure(cause: impl fmt::Display) -> Self {
        Self::new("", RuleKind::Read, format!("failed to read row: {cause}"))
    }

    /// Creates the row-level violation used when the row's record was lost
    pub fn write_failure(cause: impl fmt::Display) -> Self {
        Self::new("", RuleKind::Write, format!("failed to write record: {cause}"))
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "[{}] {}", self.rule, self.message)
        } else {
            write!(f, "{} [{}] {}", self.field, self.rule, self.message)
        }
    }
}

/// Per-row audit entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    /// Run the row belongs to
    pub run_id: RunId,

    /// Row ordinal
    pub row_ordinal: u64,

    /// Row status
    pub status: ProcessStatus,

    /// Violations, empty on success
    pub violations: Vec<FieldViolation>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Detail {
    /// Creates a detail, deriving the status from the violations
    pub fn new(run_id: RunId, row_ordinal: u64, violations: Vec<FieldViolation>) -> Self {
        let status = if violations.is_empty() {
            ProcessStatus::Success
        } else {
            ProcessStatus::Error
        };
        Self {
            run_id,
            row_ordinal,
            status,
            violations,
            created_at: Utc::now(),
        }
    }

    /// Returns true when the row was processed successfully
    pub fn is_success(&self) -> bool {
        self.status == ProcessStatus::Success
    }

    /// Downgrades a successful detail after its record write was lost
    ///
    /// Returns `true` when the detail changed. Details that already carry an
    /// error are left untouched.
    pub fn downgrade(&mut self, violation: FieldViolation) -> bool {
        if !self.is_success() {
            return false;
        }
        self.status = ProcessStatus::Error;
        self.violations.push(violation);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_id() -> RunId {
        RunId::new("R-1").unwrap()
    }

    #[test]
    fn test_detail_status_from_violations() {
        let ok = Detail::new(run_id(), 1, Vec::new());
        assert!(ok.is_success());

        let failed = Detail::new(
            run_id(),
            2,
            vec![FieldViolation::new("field1", RuleKind::Required, "field1 is required")],
        );
        assert_eq!(failed.status, ProcessStatus::Error);
    }

    #[test]
    fn test_downgrade_only_touches_success() {
        let mut ok = Detail::new(run_id(), 1, Vec::new());
        assert!(ok.downgrade(FieldViolation::write_failure("duplicate key")));
        assert_eq!(ok.status, ProcessStatus::Error);
        assert_eq!(ok.violations[0].rule, RuleKind::Write);

        let mut failed = Detail::new(run_id(), 2, vec![FieldViolation::read_failure("eof")]);
        assert!(!failed.downgrade(FieldViolation::write_failure("duplicate key")));
        assert_eq!(failed.violations.len(), 1);
    }

    #[test]
    fn test_violation_display() {
        let v = FieldViolation::new("field2", RuleKind::MaxLength, "must be at most 10 characters");
        assert_eq!(v.to_string(), "field2 [max_length] must be at most 10 characters");
        let read = FieldViolation::read_failure("invalid UTF-8");
        assert_eq!(read.to_string(), "[read] failed to read row: invalid UTF-8");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ProcessStatus::Error).unwrap();
        assert_eq!(json, "\"error\"");
        let rule = serde_json::to_string(&RuleKind::MaxLength).unwrap();
        assert_eq!(rule, "\"max_length\"");
    }
}
