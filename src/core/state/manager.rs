//! State manager for checkpoint persistence
//!
//! This module provides the StateManager for loading and saving run
//! checkpoints through a [`StateStorage`] backend.

use crate::adapters::database::traits::StateStorage;
use crate::core::state::run_state::RunState;
use crate::domain::ids::RunId;
use crate::domain::Result;
use std::sync::Arc;

/// State manager for checkpoint persistence
///
/// The coordinator never touches storage itself; the caller loads a
/// checkpoint through this manager, passes it in, and saves what comes back.
pub struct StateManager {
    /// State storage backend
    storage: Arc<dyn StateStorage + Send + Sync>,
}

impl StateManager {
    /// Create a new StateManager with a state storage backend
    pub fn new_with_storage(storage: Arc<dyn StateStorage + Send + Sync>) -> Self {
        Self { storage }
    }

    /// Load a checkpoint
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(RunState))` if found, `Ok(None)` if the run never
    /// saved a checkpoint.
    pub async fn load_run_state(&self, run_id: &RunId) -> Result<Option<RunState>> {
        self.storage.load_run_state(run_id).await
    }

    /// Load a checkpoint, falling back to a fresh one
    pub async fn load_or_new(&self, run_id: &RunId) -> Result<RunState> {
        Ok(self
            .load_run_state(run_id)
            .await?
            .unwrap_or_else(|| RunState::new(run_id.clone())))
    }

    /// Save a checkpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert operation fails.
    pub async fn save_run_state(&self, state: &RunState) -> Result<()> {
        tracing::info!(
            run_id = %state.run_id,
            next_row = state.next_row,
            completed = state.completed,
            success_count = state.success_count,
            failure_count = state.failure_count,
            "Saving run checkpoint"
        );

        self.storage.save_run_state(state).await
    }

    /// List every stored checkpoint
    pub async fn list_run_states(&self) -> Result<Vec<RunState>> {
        self.storage.list_run_states().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;

    #[tokio::test]
    async fn test_load_or_new_returns_fresh_state() {
        let manager = StateManager::new_with_storage(Arc::new(MemoryStore::new()));
        let run_id = RunId::new("R-1").unwrap();

        let state = manager.load_or_new(&run_id).await.unwrap();
        assert_eq!(state.next_row, 1);
        assert!(manager.load_run_state(&run_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_list() {
        let manager = StateManager::new_with_storage(Arc::new(MemoryStore::new()));
        let mut state = RunState::new(RunId::new("R-1").unwrap());
        state.next_row = 12;
        manager.save_run_state(&state).await.unwrap();

        let loaded = manager.load_or_new(&state.run_id).await.unwrap();
        assert_eq!(loaded.next_row, 12);
        assert_eq!(manager.list_run_states().await.unwrap().len(), 1);
    }
}
