//! External system integrations for Sluice.
//!
//! - [`source`] - Fetching the source file (local directory or HTTP)
//! - [`rows`] - Streaming rows out of the local copy
//! - [`database`] - Writer and checkpoint traits, plus the factory
//! - [`postgresql`] - PostgreSQL implementation
//! - [`memory`] - In-process implementation used for dry runs and tests
//! - [`state_file`] - JSON file checkpoints
//!
//! # Design Pattern
//!
//! The ingestion loop only sees trait objects. The entry point builds the
//! concrete adapters once and injects them, so tests substitute failing or
//! in-memory implementations without touching the loop.

pub mod database;
pub mod memory;
pub mod postgresql;
pub mod rows;
pub mod source;
pub mod state_file;
