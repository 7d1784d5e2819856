//! File-backed checkpoint storage
//!
//! One pretty-printed JSON document per run, named `<run_id>.json`. Writes go
//! to a temporary sibling first and are renamed into place.

use crate::adapters::database::traits::StateStorage;
use crate::core::state::run_state::RunState;
use crate::domain::errors::SluiceError;
use crate::domain::ids::RunId;
use crate::domain::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Checkpoint storage in a local directory
#[derive(Debug, Clone)]
pub struct FileStateStorage {
    directory: PathBuf,
}

impl FileStateStorage {
    /// Creates a storage rooted at `directory`; the directory is created lazily
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Directory holding the checkpoints
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, run_id: &RunId) -> PathBuf {
        self.directory.join(format!("{}.json", run_id.as_str()))
    }
}

#[async_trait]
impl StateStorage for FileStateStorage {
    async fn load_run_state(&self, run_id: &RunId) -> Result<Option<RunState>> {
        let path = self.path_for(run_id);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SluiceError::State(format!(
                    "Failed to read checkpoint {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let state = serde_json::from_str(&contents).map_err(|e| {
            SluiceError::State(format!("Corrupt checkpoint {}: {}", path.display(), e))
        })?;
        Ok(Some(state))
    }

    async fn save_run_state(&self, state: &RunState) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let path = self.path_for(&state.run_id);
        let staging = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(state)?;

        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &path).await?;

        tracing::debug!(path = %path.display(), "Checkpoint written");
        Ok(())
    }

    async fn list_run_states(&self) -> Result<Vec<RunState>> {
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut states = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let contents = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<RunState>(&contents) {
                Ok(state) => states.push(state),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable checkpoint")
                }
            }
        }

        states.sort_by(|a, b| a.run_id.as_str().cmp(b.run_id.as_str()));
        Ok(states)
    }
}
