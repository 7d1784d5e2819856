//! Row validation
//!
//! The schema is a declarative table of [`FieldRule`]s, one per column. Every
//! rule of every field is evaluated; violations are collected in column order
//! and then rule order, without short-circuiting.

pub mod rules;

pub use rules::Rule;

use crate::domain::detail::FieldViolation;
use crate::domain::row::Row;

/// Ordered list of violations; empty means the row is valid
pub type ValidationOutcome = Vec<FieldViolation>;

/// Rules attached to one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    /// Field name reported in violations
    pub name: &'static str,

    /// Rules evaluated in order
    pub rules: Vec<Rule>,
}

impl FieldRule {
    /// Creates a field rule entry
    pub fn new(name: &'static str, rules: Vec<Rule>) -> Self {
        Self { name, rules }
    }
}

/// Column schema of a source row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    fields: Vec<FieldRule>,
}

impl RowSchema {
    /// Creates a schema from field rules in column order
    pub fn new(fields: Vec<FieldRule>) -> Self {
        Self { fields }
    }

    /// The seven-column membership layout
    pub fn standard() -> Self {
        use Rule::{Date, MaxLength, Required};

        Self::new(vec![
            FieldRule::new("insurer_number", vec![Required, MaxLength(6)]),
            FieldRule::new("insured_number", vec![Required, MaxLength(10)]),
            FieldRule::new("holder_name", vec![Required, MaxLength(64)]),
            FieldRule::new("address", vec![Required, MaxLength(128)]),
            FieldRule::new("birth_date", vec![Required, Date]),
            FieldRule::new("valid_from", vec![Required, Date]),
            FieldRule::new("valid_until", vec![Required, Date]),
        ])
    }

    /// Field rules in column order
    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    /// Validates a row; columns missing from a short row validate as empty
    pub fn validate(&self, row: &Row) -> ValidationOutcome {
        self.fields
            .iter()
            .enumerate()
            .flat_map(|(index, field)| {
                let value = row.field(index);
                field
                    .rules
                    .iter()
                    .filter_map(move |rule| rule.check(field.name, value))
            })
            .collect()
    }
}

impl Default for RowSchema {
    fn default() -> Self {
        Self::standard()
    }
}
