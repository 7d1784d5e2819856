// Sluice - Resumable CSV ingestion with per-row audit trail
// Copyright (c) 2025 Sluice Contributors
// Licensed under the MIT License

//! # Sluice - Resumable CSV ingestion
//!
//! Sluice ingests a delimited file from remote storage, validates every row
//! against a fixed schema, and writes the valid rows as records together with
//! one audit detail per row into a transactional store.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Staging** source files from a local directory or an HTTP endpoint
//! - **Validating** rows field by field, collecting every violation
//! - **Writing** records and details in atomic batches of at most 100 items
//! - **Resuming** interrupted runs from a persisted checkpoint
//!
//! ## Architecture
//!
//! Sluice follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (ingest, validation, state)
//! - [`adapters`] - External integrations (source storage, CSV, PostgreSQL)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sluice::adapters::database::create_storage;
//! use sluice::adapters::rows::CsvRowSource;
//! use sluice::adapters::source::create_source_storage;
//! use sluice::config::load_config;
//! use sluice::core::ingest::{IngestCoordinator, IngestSettings};
//! use sluice::core::state::StateManager;
//! use sluice::domain::ids::{RunId, SourceKey};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("sluice.toml")?;
//!     let storage = create_storage(&config, false).await?;
//!     let state_manager = StateManager::new_with_storage(storage.state);
//!
//!     let coordinator = IngestCoordinator::new(
//!         IngestSettings::from_config(&config.ingest, SourceKey::new("members.csv")?),
//!         create_source_storage(&config.source)?,
//!         Arc::new(CsvRowSource::from_config(&config.source.csv)?),
//!         storage.writer,
//!     );
//!
//!     let run_id = RunId::new("2025-04-01")?;
//!     let state = state_manager.load_or_new(&run_id).await?;
//!     let (_tx, cancel) = tokio::sync::watch::channel(false);
//!
//!     let report = coordinator.run(state, cancel).await?;
//!     state_manager.save_run_state(&report.state).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Handling
//!
//! A failed write of a full batch does not stop the run: rows whose records
//! were lost are downgraded to errors and counted as failures. Failures while
//! flushing the last batch or writing the run summary abort the run with a
//! [`core::ingest::RunAbort`] carrying the checkpoint, so the caller can save
//! it and retry. Re-running a completed run writes nothing.
//!
//! ## Error Handling
//!
//! Sluice uses the [`domain::SluiceError`] type for all errors:
//!
//! ```rust,no_run
//! use sluice::domain::SluiceError;
//!
//! fn example() -> Result<(), SluiceError> {
//!     let _config = sluice::config::load_config("sluice.toml")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
