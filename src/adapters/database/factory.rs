//! Storage factory
//!
//! Builds the writer and checkpoint storage selected by configuration. The
//! PostgreSQL pool is created once here and shared by both handles.

use crate::adapters::database::traits::{AtomicWriter, StateStorage};
use crate::adapters::memory::MemoryStore;
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::state_file::FileStateStorage;
use crate::config::schema::{DatabaseTarget, PostgreSQLConfig, SluiceConfig, StateBackend};
use crate::domain::{Result, SluiceError};
use std::sync::Arc;

/// Writer and checkpoint storage for one process
pub struct StorageHandles {
    /// Atomic writer for records, summaries and details
    pub writer: Arc<dyn AtomicWriter>,

    /// Checkpoint storage
    pub state: Arc<dyn StateStorage + Send + Sync>,
}

fn postgresql_config(config: &SluiceConfig) -> Result<&PostgreSQLConfig> {
    config.postgresql.as_ref().ok_or_else(|| {
        SluiceError::Configuration(
            "postgresql configuration is required for the selected storage".to_string(),
        )
    })
}

async fn connect_postgresql(config: &SluiceConfig) -> Result<Arc<PostgreSQLAdapter>> {
    let pg_config = postgresql_config(config)?;

    tracing::info!("Creating PostgreSQL client");
    let client = Arc::new(PostgreSQLClient::new(pg_config.clone())?);
    client.test_connection().await?;
    client.ensure_schema().await?;

    Ok(Arc::new(PostgreSQLAdapter::new_with_arc(client)))
}

/// Create the writer and checkpoint storage
///
/// With `dry_run` set, both handles point at a fresh [`MemoryStore`] and
/// nothing outlives the process.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or its schema cannot
/// be created.
pub async fn create_storage(config: &SluiceConfig, dry_run: bool) -> Result<StorageHandles> {
    if dry_run {
        tracing::info!("DRY RUN: writes and checkpoints stay in memory");
        let store = Arc::new(MemoryStore::new());
        return Ok(StorageHandles {
            writer: store.clone() as Arc<dyn AtomicWriter>,
            state: store as Arc<dyn StateStorage + Send + Sync>,
        });
    }

    let postgres = match config.database_target {
        DatabaseTarget::PostgreSQL => Some(connect_postgresql(config).await?),
        DatabaseTarget::Memory => None,
    };

    let writer: Arc<dyn AtomicWriter> = match postgres {
        Some(ref adapter) => adapter.clone(),
        None => {
            tracing::warn!("database_target = 'memory': records are not persisted");
            Arc::new(MemoryStore::new())
        }
    };

    let state: Arc<dyn StateStorage + Send + Sync> = match (config.state.backend, postgres) {
        (StateBackend::Database, Some(adapter)) => adapter,
        (StateBackend::Database, None) => {
            return Err(SluiceError::Configuration(
                "state.backend = 'database' requires database_target = 'postgresql'".to_string(),
            ))
        }
        (StateBackend::File, _) => Arc::new(FileStateStorage::new(&config.state.directory)),
    };

    Ok(StorageHandles { writer, state })
}

/// Create only the checkpoint storage
///
/// # Errors
///
/// Returns an error if the database backend cannot be reached.
pub async fn create_state_storage(
    config: &SluiceConfig,
) -> Result<Arc<dyn StateStorage + Send + Sync>> {
    match config.state.backend {
        StateBackend::File => {
            tracing::debug!(directory = %config.state.directory, "Using file checkpoint storage");
            Ok(Arc::new(FileStateStorage::new(&config.state.directory)))
        }
        StateBackend::Database => {
            let adapter = connect_postgresql(config).await?;
            Ok(adapter as Arc<dyn StateStorage + Send + Sync>)
        }
    }
}
