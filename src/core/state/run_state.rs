//! Run checkpoint model
//!
//! This module defines the checkpoint persisted between invocations of the
//! same run. The coordinator reads it once at start and hands back an updated
//! copy on exit, including on a fatal abort.

use crate::domain::ids::RunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Checkpoint of an ingestion run
///
/// # Examples
///
/// ```
/// use sluice::core::state::run_state::{RunState, RunStateBuilder};
/// use sluice::domain::ids::RunId;
///
/// let state = RunStateBuilder::new(RunId::new("R-1").unwrap())
///     .next_row(50)
///     .success_count(40)
///     .failure_count(9)
///     .build();
///
/// assert_eq!(state.rows_processed(), 49);
/// assert!(!state.completed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Run identifier
    pub run_id: RunId,

    /// Ordinal of the next row to process (1-based)
    pub next_row: u64,

    /// Whether the summary has been written and the run is finished
    pub completed: bool,

    /// Cumulative successful rows across invocations
    pub success_count: u64,

    /// Cumulative failed rows across invocations
    pub failure_count: u64,

    /// Insurer number of the first valid record seen by the run
    #[serde(default)]
    pub first_record_key: Option<String>,

    /// Last time the checkpoint changed
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl RunState {
    /// Creates a fresh checkpoint for a run that has not started
    pub fn new(run_id: RunId) -> Self {
        RunStateBuilder::new(run_id).build()
    }

    /// Rows counted so far
    pub fn rows_processed(&self) -> u64 {
        self.success_count + self.failure_count
    }

    /// Records one successful row
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    /// Records one failed row
    pub fn record_failure(&mut self) {
        self.failure_count += 1;
    }

    /// Moves `count` rows from the success to the failure tally
    pub fn reclassify_as_failed(&mut self, count: u64) {
        let moved = count.min(self.success_count);
        self.success_count -= moved;
        self.failure_count += moved;
    }

    /// Remembers the first record key unless one is already known
    pub fn remember_first_key(&mut self, key: &str) {
        if self.first_record_key.is_none() {
            self.first_record_key = Some(key.to_string());
        }
    }

    /// Marks the run as completed
    pub fn mark_completed(&mut self) {
        self.completed = true;
        self.touch();
    }

    /// Refreshes the update timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Builder for creating RunState instances
pub struct RunStateBuilder {
    run_id: RunId,
    next_row: u64,
    completed: bool,
    success_count: u64,
    failure_count: u64,
    first_record_key: Option<String>,
}

impl RunStateBuilder {
    /// Create a new builder for a run starting at row 1
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            next_row: 1,
            completed: false,
            success_count: 0,
            failure_count: 0,
            first_record_key: None,
        }
    }

    /// Set the next row ordinal
    pub fn next_row(mut self, next_row: u64) -> Self {
        self.next_row = next_row;
        self
    }

    /// Set the completed flag
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Set the success count
    pub fn success_count(mut self, count: u64) -> Self {
        self.success_count = count;
        self
    }

    /// Set the failure count
    pub fn failure_count(mut self, count: u64) -> Self {
        self.failure_count = count;
        self
    }

    /// Set the first record key
    pub fn first_record_key(mut self, key: impl Into<String>) -> Self {
        self.first_record_key = Some(key.into());
        self
    }

    /// Build the RunState instance
    pub fn build(self) -> RunState {
        RunState {
            run_id: self.run_id,
            next_row: self.next_row,
            completed: self.completed,
            success_count: self.success_count,
            failure_count: self.failure_count,
            first_record_key: self.first_record_key,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_id() -> RunId {
        RunId::new("R-2025-0001").unwrap()
    }

    #[test]
    fn test_new_state_starts_at_first_row() {
        let state = RunState::new(run_id());
        assert_eq!(state.next_row, 1);
        assert!(!state.completed);
        assert_eq!(state.rows_processed(), 0);
        assert!(state.first_record_key.is_none());
    }

    #[test]
    fn test_counters() {
        let mut state = RunState::new(run_id());
        state.record_success();
        state.record_success();
        state.record_failure();
        assert_eq!(state.success_count, 2);
        assert_eq!(state.failure_count, 1);

        state.reclassify_as_failed(1);
        assert_eq!(state.success_count, 1);
        assert_eq!(state.failure_count, 2);
        assert_eq!(state.rows_processed(), 3);
    }

    #[test]
    fn test_reclassify_never_underflows() {
        let mut state = RunState::new(run_id());
        state.record_success();
        state.reclassify_as_failed(5);
        assert_eq!(state.success_count, 0);
        assert_eq!(state.failure_count, 1);
    }

    #[test]
    fn test_first_key_is_kept() {
        let mut state = RunState::new(run_id());
        state.remember_first_key("111111");
        state.remember_first_key("222222");
        assert_eq!(state.first_record_key.as_deref(), Some("111111"));
    }

    #[test]
    fn test_mark_completed() {
        let mut state = RunState::new(run_id());
        let before = state.updated_at;
        state.mark_completed();
        assert!(state.completed);
        assert!(state.updated_at >= before);
    }

    #[test]
    fn test_serialization_without_optional_fields() {
        let json = r#"{
            "run_id": "R-7",
            "next_row": 50,
            "completed": false,
            "success_count": 40,
            "failure_count": 9
        }"#;
        let state: RunState = serde_json::from_str(json).unwrap();
        assert_eq!(state.run_id.as_str(), "R-7");
        assert_eq!(state.next_row, 50);
        assert!(state.first_record_key.is_none());
    }

    #[test]
    fn test_serialization_roundtrip_keeps_key() {
        let state = RunStateBuilder::new(run_id())
            .next_row(101)
            .success_count(100)
            .first_record_key("123456")
            .completed(true)
            .build();
        let json = serde_json::to_string(&state).unwrap();
        let back: RunState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
