//! Configuration management for Sluice.
//!
//! Sluice reads a single TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SLUICE_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation before anything connects
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "postgresql"
//!
//! [application]
//! log_level = "info"
//!
//! [source]
//! backend = "http"
//! location = "https://files.example.com/uploads/"
//! key = "members.csv"
//! auth_token = "${SLUICE_SOURCE_TOKEN}"
//!
//! [ingest]
//! batch_ceiling = 100
//!
//! [postgresql]
//! connection_string = "${SLUICE_PG_URL}"
//!
//! [state]
//! backend = "database"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, CsvConfig, DatabaseTarget, IngestConfig, LoggingConfig, PostgreSQLConfig,
    RetryConfig, SluiceConfig, SourceBackend, SourceConfig, StateBackend, StateConfig,
    MAX_WRITE_ITEMS,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
