//! Check-file command implementation
//!
//! Runs the row validator over a local file and prints every violation.
//! Nothing is written anywhere.

use crate::adapters::rows::{CsvRowSource, RowSource};
use crate::config::{load_config, CsvConfig};
use crate::core::ingest::RowBuilder;
use crate::core::validation::RowSchema;
use crate::domain::ids::RunId;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the check-file command
#[derive(Args, Debug)]
pub struct CheckFileArgs {
    /// Local file to check
    pub path: PathBuf,

    /// Maximum number of failing rows to print
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

/// Counts produced by a file check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckTotals {
    /// Rows that would produce a record
    pub valid: u64,
    /// Rows that would be recorded as errors
    pub invalid: u64,
}

impl CheckFileArgs {
    /// Execute the check-file command
    ///
    /// The CSV dialect comes from the configuration file when it loads, and
    /// falls back to the defaults otherwise.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(path = %self.path.display(), "Checking file");

        let csv = match load_config(config_path) {
            Ok(config) => config.source.csv,
            Err(e) => {
                tracing::debug!(error = %e, "No usable configuration - using default CSV dialect");
                CsvConfig::default()
            }
        };

        let source = match CsvRowSource::from_config(&csv) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Configuration validation failed: {e}");
                return Ok(2);
            }
        };

        println!("🔍 Checking {}", self.path.display());
        println!();

        let totals = match self.check(&source) {
            Ok(totals) => totals,
            Err(e) => {
                eprintln!("Failed to read file: {e}");
                return Ok(5);
            }
        };

        println!();
        println!("  Valid rows: {}", totals.valid);
        println!("  Invalid rows: {}", totals.invalid);
        println!();

        if totals.invalid == 0 {
            println!("✅ No violations found");
            Ok(0)
        } else {
            println!("⚠️  File has invalid rows");
            Ok(1)
        }
    }

    /// Validates every row of the file, printing up to `limit` failing rows
    pub fn check(&self, source: &dyn RowSource) -> crate::domain::Result<CheckTotals> {
        let rows = source.open(&self.path)?;
        let builder = RowBuilder::new(RowSchema::standard(), RunId::generate());
        let mut totals = CheckTotals::default();

        for (ordinal, item) in (1u64..).zip(rows) {
            let outcome = builder.build(ordinal, item);
            if outcome.is_success() {
                totals.valid += 1;
                continue;
            }

            totals.invalid += 1;
            if totals.invalid as usize <= self.limit {
                println!("  Row {ordinal}:");
                for violation in &outcome.detail.violations {
                    println!("    - {violation}");
                }
            }
        }

        if totals.invalid as usize > self.limit {
            println!("  ... and {} more invalid rows", totals.invalid as usize - self.limit);
        }

        Ok(totals)
    }
}
