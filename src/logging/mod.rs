//! Logging and observability
//!
//! Structured logging through `tracing`: a human-readable console layer plus
//! an optional JSON file layer with rotation.
//!
//! # Example
//!
//! ```no_run
//! use sluice::logging::init_logging;
//! use sluice::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config)?;
//!
//! tracing::info!(run_id = "R-1", "Run accepted");
//! # Ok::<(), sluice::domain::SluiceError>(())
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of an ingestion run
///
/// # Example
///
/// ```no_run
/// use sluice::log_run_start;
/// use sluice::domain::ids::{RunId, SourceKey};
///
/// let run_id = RunId::new("R-1").unwrap();
/// let key = SourceKey::new("members.csv").unwrap();
/// log_run_start!(&run_id, &key, 1);
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($run_id:expr, $source_key:expr, $first_row:expr) => {
        tracing::info!(
            run_id = %$run_id,
            source_key = %$source_key,
            first_row = $first_row,
            "Starting ingestion run"
        );
    };
}

/// Log the end of an ingestion run
///
/// # Example
///
/// ```no_run
/// use sluice::log_run_complete;
/// use std::time::Duration;
///
/// log_run_complete!("R-1", 98, 2, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($run_id:expr, $success:expr, $failure:expr, $duration:expr) => {
        tracing::info!(
            run_id = %$run_id,
            success_count = $success,
            failure_count = $failure,
            duration_ms = $duration.as_millis() as u64,
            "Ingestion run completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use sluice::log_error_with_context;
/// use sluice::domain::SluiceError;
///
/// let error = SluiceError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use sluice::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "connection reset");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
