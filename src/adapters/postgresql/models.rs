//! PostgreSQL row models
//!
//! PostgreSQL has no unsigned integers, so counters and ordinals are stored as
//! `BIGINT` and converted at the boundary.

use crate::core::state::run_state::RunState;
use crate::domain::ids::RunId;
use crate::domain::{Detail, Result, SluiceError};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Converts an unsigned counter to a `BIGINT` column value
pub fn to_bigint(value: u64, column: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| SluiceError::Database(format!("{} out of range: {}", column, value)))
}

/// Converts a `BIGINT` column value back to an unsigned counter
pub fn from_bigint(value: i64, column: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| SluiceError::Database(format!("{} is negative: {}", column, value)))
}

/// Row of the `ingest_runs` table
#[derive(Debug, Clone, PartialEq)]
pub struct PostgreSQLRunState {
    pub run_id: String,
    pub next_row: i64,
    pub completed: bool,
    pub success_count: i64,
    pub failure_count: i64,
    pub first_record_key: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PostgreSQLRunState {
    /// Convert from the domain checkpoint
    pub fn from_domain(state: &RunState) -> Result<Self> {
        Ok(Self {
            run_id: state.run_id.as_str().to_string(),
            next_row: to_bigint(state.next_row, "next_row")?,
            completed: state.completed,
            success_count: to_bigint(state.success_count, "success_count")?,
            failure_count: to_bigint(state.failure_count, "failure_count")?,
            first_record_key: state.first_record_key.clone(),
            updated_at: state.updated_at,
        })
    }

    /// Convert to the domain checkpoint
    pub fn to_domain(self) -> Result<RunState> {
        Ok(RunState {
            run_id: RunId::new(self.run_id).map_err(SluiceError::State)?,
            next_row: from_bigint(self.next_row, "next_row")?,
            completed: self.completed,
            success_count: from_bigint(self.success_count, "success_count")?,
            failure_count: from_bigint(self.failure_count, "failure_count")?,
            first_record_key: self.first_record_key,
            updated_at: self.updated_at,
        })
    }

    /// Build from a query row
    pub fn from_row(row: &tokio_postgres::Row) -> Self {
        Self {
            run_id: row.get("run_id"),
            next_row: row.get("next_row"),
            completed: row.get("completed"),
            success_count: row.get("success_count"),
            failure_count: row.get("failure_count"),
            first_record_key: row.get("first_record_key"),
            updated_at: row.get("updated_at"),
        }
    }
}

/// Column values of one `row_details` insert
#[derive(Debug, Clone, PartialEq)]
pub struct PostgreSQLDetail {
    pub run_id: String,
    pub row_ordinal: i64,
    pub status: &'static str,
    pub violations: Value,
    pub created_at: DateTime<Utc>,
}

impl PostgreSQLDetail {
    /// Convert from the domain detail
    pub fn from_domain(detail: &Detail) -> Result<Self> {
        Ok(Self {
            run_id: detail.run_id.as_str().to_string(),
            row_ordinal: to_bigint(detail.row_ordinal, "row_ordinal")?,
            status: detail.status.as_str(),
            violations: serde_json::to_value(&detail.violations)?,
            created_at: detail.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::run_state::RunStateBuilder;
    use crate::domain::{FieldViolation, RuleKind};

    #[test]
    fn test_run_state_roundtrip() {
        let state = RunStateBuilder::new(RunId::new("R-9").unwrap())
            .next_row(151)
            .success_count(140)
            .failure_count(10)
            .first_record_key("654321")
            .build();

        let row = PostgreSQLRunState::from_domain(&state).unwrap();
        assert_eq!(row.next_row, 151);
        assert_eq!(row.to_domain().unwrap(), state);
    }

    #[test]
    fn test_negative_counter_is_rejected() {
        assert!(from_bigint(-1, "next_row").is_err());
        assert!(to_bigint(u64::MAX, "next_row").is_err());
    }

    #[test]
    fn test_detail_columns() {
        let detail = Detail::new(
            RunId::new("R-9").unwrap(),
            3,
            vec![FieldViolation::new("address", RuleKind::Required, "address is required")],
        );
        let row = PostgreSQLDetail::from_domain(&detail).unwrap();
        assert_eq!(row.status, "error");
        assert_eq!(row.violations[0]["rule"], "required");
        assert_eq!(row.violations[0]["field"], "address");
    }
}
