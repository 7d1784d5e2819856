//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod check_file;
pub mod ingest;
pub mod init;
pub mod status;
pub mod validate;
