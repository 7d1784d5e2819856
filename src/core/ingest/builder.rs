//! Record/Detail builder
//!
//! Turns one row (or the read error standing in for it) into a [`RowOutcome`]:
//! always a [`Detail`], plus a [`Record`] when the row is valid.

use crate::adapters::rows::RowItem;
use crate::core::state::run_state::RunState;
use crate::core::validation::RowSchema;
use crate::domain::detail::{FieldViolation, RuleKind};
use crate::domain::ids::RunId;
use crate::domain::{Detail, Record, Row};

/// Result of processing one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    /// Audit entry, always present
    pub detail: Detail,

    /// Record, present only for valid rows
    pub record: Option<Record>,
}

impl RowOutcome {
    /// Returns true when the row produced a record
    pub fn is_success(&self) -> bool {
        self.record.is_some()
    }

    /// Applies the row to the run counters, exactly once per row
    pub fn apply_to(&self, state: &mut RunState) {
        match self.record {
            Some(ref record) => {
                state.record_success();
                state.remember_first_key(&record.insurer_number);
            }
            None => state.record_failure(),
        }
    }
}

/// Builds row outcomes for one run
#[derive(Debug, Clone)]
pub struct RowBuilder {
    schema: RowSchema,
    run_id: RunId,
}

impl RowBuilder {
    /// Creates a builder for `run_id`
    pub fn new(schema: RowSchema, run_id: RunId) -> Self {
        Self { schema, run_id }
    }

    /// Builds the outcome of the row at `ordinal`
    ///
    /// A read error skips validation and yields a single read violation.
    pub fn build(&self, ordinal: u64, item: RowItem) -> RowOutcome {
        let fields = match item {
            Ok(fields) => fields,
            Err(cause) => {
                return RowOutcome {
                    detail: Detail::new(
                        self.run_id.clone(),
                        ordinal,
                        vec![FieldViolation::read_failure(cause)],
                    ),
                    record: None,
                }
            }
        };

        let row = Row::new(ordinal, fields);
        let mut violations = self.schema.validate(&row);

        let record = if violations.is_empty() {
            match Record::from_row(&self.run_id, &row) {
                Ok(record) => Some(record),
                Err(message) => {
                    violations.push(FieldViolation::new("", RuleKind::Date, message));
                    None
                }
            }
        } else {
            None
        };

        RowOutcome {
            detail: Detail::new(self.run_id.clone(), ordinal, violations),
            record,
        }
    }
}
