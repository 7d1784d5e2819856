//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Sluice configuration file.

use crate::config::load_config;
use crate::config::schema::{DatabaseTarget, SluiceConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// `load_config` already validates, so a load failure covers both syntax
    /// and semantic errors.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                print_summary(&config);
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2) // Configuration error exit code
            }
        }
    }
}

fn print_summary(config: &SluiceConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);
    println!("  Source Backend: {:?}", config.source.backend);
    println!("  Source Location: {}", config.source.location);
    println!(
        "  Source Key: {}",
        config.source.key.as_deref().unwrap_or("(set with --source-key)")
    );
    println!("  Delimiter: {:?}", config.source.csv.delimiter);

    match config.database_target {
        DatabaseTarget::PostgreSQL => {
            if let Some(ref pg_config) = config.postgresql {
                use secrecy::ExposeSecret;
                let connection: &str = pg_config.connection_string.expose_secret().as_ref();
                println!("  Database Target: PostgreSQL");
                println!(
                    "  PostgreSQL Connection: {}",
                    connection.split('@').next_back().unwrap_or("***")
                );
                println!("  Max Connections: {}", pg_config.max_connections);
            }
        }
        DatabaseTarget::Memory => {
            println!("  Database Target: Memory (nothing is persisted)");
        }
    }

    println!("  State Backend: {:?}", config.state.backend);
    println!("  Batch Ceiling: {}", config.ingest.batch_ceiling);
    println!("  Finalize On Cancel: {}", config.ingest.finalize_on_cancel);
    println!();
}
