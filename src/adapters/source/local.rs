//! Local directory source

use super::SourceStorage;
use crate::domain::errors::SluiceError;
use crate::domain::ids::SourceKey;
use crate::domain::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Source storage backed by a local directory
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    /// Creates a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SourceStorage for LocalSource {
    async fn download(&self, destination: &Path, key: &SourceKey) -> Result<()> {
        let source = self.root.join(key.as_str());
        let bytes = tokio::fs::copy(&source, destination).await.map_err(|e| {
            SluiceError::SourceUnavailable(format!(
                "Failed to copy {} to {}: {}",
                source.display(),
                destination.display(),
                e
            ))
        })?;

        tracing::debug!(source = %source.display(), bytes, "Source file copied");
        Ok(())
    }
}
