//! Core business logic for Sluice.
//!
//! # Modules
//!
//! - [`ingest`] - Run orchestration, batching and reporting
//! - [`state`] - Run checkpoints and resume decisions
//! - [`validation`] - Row schema and field rules
//!
//! # Ingestion Workflow
//!
//! 1. **Load State**: Read the run checkpoint, or start a fresh one
//! 2. **Stage**: Download the source file into a scratch directory
//! 3. **Resume**: Skip the rows the checkpoint already counts
//! 4. **Stream**: Validate each row and build its record and audit detail
//! 5. **Flush**: Write full batches, degrading rows whose records were lost
//! 6. **Finalize**: Flush the remainder and write the run summary
//! 7. **Checkpoint**: Persist the updated state
//!
//! # Example
//!
//! ```rust,no_run
//! use sluice::adapters::memory::MemoryStore;
//! use sluice::adapters::rows::csv_source::CsvRowSource;
//! use sluice::adapters::source::LocalSource;
//! use sluice::config::IngestConfig;
//! use sluice::core::ingest::{IngestCoordinator, IngestSettings};
//! use sluice::core::state::RunState;
//! use sluice::domain::ids::{RunId, SourceKey};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = IngestSettings::from_config(&IngestConfig::default(), SourceKey::new("members.csv")?);
//! let coordinator = IngestCoordinator::new(
//!     settings,
//!     Arc::new(LocalSource::new("/srv/incoming")),
//!     Arc::new(CsvRowSource::default()),
//!     Arc::new(MemoryStore::new()),
//! );
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let report = coordinator.run(RunState::new(RunId::new("R-1")?), shutdown_rx).await?;
//!
//! println!("Success: {}", report.state.success_count);
//! println!("Failure: {}", report.state.failure_count);
//! # Ok(())
//! # }
//! ```

pub mod ingest;
pub mod state;
pub mod validation;
