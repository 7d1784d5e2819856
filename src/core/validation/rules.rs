//! Field-level validation rules
//!
//! Each [`Rule`] checks one field value and reports at most one violation.

use crate::domain::detail::{FieldViolation, RuleKind};
use crate::domain::record::parse_calendar_date;

/// A single validation rule applied to a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Value must not be blank
    Required,

    /// Value must be at most this many characters
    MaxLength(usize),

    /// Value must be a calendar date; blank values are left to `Required`
    Date,
}

impl Rule {
    /// Returns the kind recorded on violations of this rule
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Required => RuleKind::Required,
            Rule::MaxLength(_) => RuleKind::MaxLength,
            Rule::Date => RuleKind::Date,
        }
    }

    /// Checks `value` against the rule
    pub fn check(&self, field: &str, value: &str) -> Option<FieldViolation> {
        match *self {
            Rule::Required if value.trim().is_empty() => Some(FieldViolation::new(
                field,
                self.kind(),
                format!("{field} is required"),
            )),
            Rule::MaxLength(limit) => {
                let length = value.chars().count();
                (length > limit).then(|| {
                    FieldViolation::new(
                        field,
                        self.kind(),
                        format!("{field} must be at most {limit} characters (got {length})"),
                    )
                })
            }
            Rule::Date if !value.trim().is_empty() && parse_calendar_date(value).is_none() => {
                Some(FieldViolation::new(
                    field,
                    self.kind(),
                    format!("{field} is not a valid date: '{value}'"),
                ))
            }
            _ => None,
        }
    }
}
