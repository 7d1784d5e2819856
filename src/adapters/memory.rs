//! In-process store
//!
//! [`MemoryStore`] honours the same contract as the PostgreSQL adapter
//! (conditional puts, all-or-nothing, item limit) without any I/O. It backs
//! dry runs and `database_target = "memory"`.

use crate::adapters::database::traits::{AtomicWriter, StateStorage, WriteBatchBounds};
use crate::core::state::run_state::RunState;
use crate::domain::errors::WriteError;
use crate::domain::ids::RunId;
use crate::domain::{Detail, Record, RecordKey, Result, SummaryResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Tables {
    records: HashMap<RecordKey, Record>,
    summaries: HashMap<RunId, SummaryResult>,
    details: HashMap<(RunId, u64), Detail>,
    runs: BTreeMap<RunId, RunState>,
}

/// In-memory implementation of [`AtomicWriter`] and [`StateStorage`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn record_count(&self) -> usize {
        self.tables.lock().await.records.len()
    }

    /// Returns a stored record
    pub async fn record(&self, key: &RecordKey) -> Option<Record> {
        self.tables.lock().await.records.get(key).cloned()
    }

    /// Stored details of a run, ordered by row ordinal
    pub async fn details(&self, run_id: &RunId) -> Vec<Detail> {
        let tables = self.tables.lock().await;
        let mut details: Vec<Detail> = tables
            .details
            .values()
            .filter(|d| &d.run_id == run_id)
            .cloned()
            .collect();
        details.sort_by_key(|d| d.row_ordinal);
        details
    }

    /// Stored summary of a run
    pub async fn summary(&self, run_id: &RunId) -> Option<SummaryResult> {
        self.tables.lock().await.summaries.get(run_id).cloned()
    }
}

#[async_trait]
impl AtomicWriter for MemoryStore {
    async fn transact_put(
        &self,
        records: &[Record],
        summary: Option<&SummaryResult>,
        details: &[Detail],
    ) -> std::result::Result<(), WriteError> {
        WriteBatchBounds::of(records, summary, details).check()?;

        let mut tables = self.tables.lock().await;

        // Check every condition before touching anything
        let mut record_keys = HashSet::new();
        for record in records {
            let key = record.key();
            if tables.records.contains_key(&key) || !record_keys.insert(key.clone()) {
                return Err(WriteError::duplicate(
                    "records",
                    format!("record {} already exists", key),
                ));
            }
        }
        if let Some(summary) = summary {
            if tables.summaries.contains_key(&summary.run_id) {
                return Err(WriteError::duplicate(
                    "run_summaries",
                    format!("summary for run {} already exists", summary.run_id),
                ));
            }
        }
        let mut detail_keys = HashSet::new();
        for detail in details {
            let key = (detail.run_id.clone(), detail.row_ordinal);
            if tables.details.contains_key(&key) || !detail_keys.insert(key) {
                return Err(WriteError::duplicate(
                    "row_details",
                    format!(
                        "detail for run {} row {} already exists",
                        detail.run_id, detail.row_ordinal
                    ),
                ));
            }
        }

        for record in records {
            tables.records.insert(record.key(), record.clone());
        }
        if let Some(summary) = summary {
            tables
                .summaries
                .insert(summary.run_id.clone(), summary.clone());
        }
        for detail in details {
            tables
                .details
                .insert((detail.run_id.clone(), detail.row_ordinal), detail.clone());
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl StateStorage for MemoryStore {
    async fn load_run_state(&self, run_id: &RunId) -> Result<Option<RunState>> {
        Ok(self.tables.lock().await.runs.get(run_id).cloned())
    }

    async fn save_run_state(&self, state: &RunState) -> Result<()> {
        self.tables
            .lock()
            .await
            .runs
            .insert(state.run_id.clone(), state.clone());
        Ok(())
    }

    async fn list_run_states(&self) -> Result<Vec<RunState>> {
        Ok(self.tables.lock().await.runs.values().cloned().collect())
    }
}
