//! Source file acquisition
//!
//! A [`SourceStorage`] copies the file named by a [`SourceKey`] to a local
//! path owned by the caller. Any failure is fatal for the run and surfaces as
//! [`SluiceError::SourceUnavailable`](crate::domain::SluiceError::SourceUnavailable).

pub mod http;
pub mod local;

pub use http::HttpSource;
pub use local::LocalSource;

use crate::config::{SourceBackend, SourceConfig};
use crate::domain::ids::SourceKey;
use crate::domain::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Fetches a source file into a local destination
#[async_trait]
pub trait SourceStorage: Send + Sync {
    /// Writes the file identified by `key` to `destination`
    ///
    /// # Errors
    ///
    /// Returns `SourceUnavailable` when the file cannot be fetched or written.
    async fn download(&self, destination: &Path, key: &SourceKey) -> Result<()>;
}

/// Builds the source storage selected by `source.backend`
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn create_source_storage(config: &SourceConfig) -> Result<Arc<dyn SourceStorage>> {
    match config.backend {
        SourceBackend::Local => {
            tracing::info!(location = %config.location, "Using local source storage");
            Ok(Arc::new(LocalSource::new(&config.location)))
        }
        SourceBackend::Http => {
            tracing::info!(location = %config.location, "Using HTTP source storage");
            Ok(Arc::new(HttpSource::new(config.clone())?))
        }
    }
}
