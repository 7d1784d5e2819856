//! Ingest command implementation
//!
//! This module implements the `ingest` command: it loads the run checkpoint,
//! drives the coordinator, and persists whatever checkpoint comes back.

use crate::adapters::database::create_storage;
use crate::adapters::rows::csv_source::CsvRowSource;
use crate::adapters::source::create_source_storage;
use crate::config::load_config;
use crate::core::ingest::{IngestCoordinator, IngestSettings, RunOutcome, RunReport};
use crate::core::state::StateManager;
use crate::domain::ids::{RunId, SourceKey};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Identifier of the run; reuse it to resume an interrupted run
    #[arg(long)]
    pub run_id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - validate and count without persisting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Override the source key from the configuration
    #[arg(long)]
    pub source_key: Option<String>,
}

impl IngestArgs {
    /// Execute the ingest command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(run_id = %self.run_id, "Starting ingest command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if let Some(key) = &self.source_key {
            tracing::info!(source_key = %key, "Overriding source key from CLI");
            config.source.key = Some(key.clone());
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        let dry_run = config.application.dry_run;

        let run_id = match RunId::new(self.run_id.as_str()) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Invalid run id: {e}");
                return Ok(2);
            }
        };

        let source_key = match config.source.key.as_deref().map(SourceKey::new) {
            Some(Ok(key)) => key,
            Some(Err(e)) => {
                eprintln!("Invalid source key: {e}");
                return Ok(2);
            }
            None => {
                eprintln!("No source key given: set source.key or pass --source-key");
                return Ok(2);
            }
        };

        let rows = match CsvRowSource::from_config(&config.source.csv) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Configuration validation failed: {e}");
                return Ok(2);
            }
        };

        if dry_run {
            tracing::info!("Dry run mode enabled - no data will be written");
            println!("🔍 DRY RUN MODE - No data will be written to the database");
            println!();
        }

        // Confirmation prompt (unless --yes or dry-run)
        if !self.yes && !dry_run {
            println!("Ingest Configuration:");
            println!("  Run ID: {run_id}");
            println!("  Source: {} ({})", source_key, config.source.location);
            println!("  Batch ceiling: {}", config.ingest.batch_ceiling);
            println!();
            print!("Proceed with ingest? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Ingest cancelled.");
                return Ok(0);
            }
        }

        let storage = match create_storage(&config, dry_run).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create storage");
                eprintln!("Failed to initialize storage: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let source = match create_source_storage(&config.source) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to initialize source: {e}");
                return Ok(4);
            }
        };

        let state_manager = StateManager::new_with_storage(storage.state);
        let state = match state_manager.load_or_new(&run_id).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to load run checkpoint: {e}");
                return Ok(4);
            }
        };

        let coordinator = IngestCoordinator::new(
            IngestSettings::from_config(&config.ingest, source_key),
            source,
            Arc::new(rows),
            storage.writer,
        );

        println!("🚀 Starting ingest...");
        println!();

        let report = match coordinator.run(state, shutdown_signal).await {
            Ok(report) => report,
            Err(abort) => {
                eprintln!("Ingest failed: {abort}");
                if let Err(e) = state_manager.save_run_state(&abort.state).await {
                    tracing::error!(error = %e, "Failed to save checkpoint after abort");
                    eprintln!("Failed to save checkpoint: {e}");
                } else {
                    println!(
                        "   Checkpoint saved at row {}. Re-run with --run-id {} to retry.",
                        abort.state.next_row, abort.state.run_id
                    );
                }
                return Ok(5); // Fatal error exit code
            }
        };

        if report.outcome != RunOutcome::AlreadyCompleted {
            if let Err(e) = state_manager.save_run_state(&report.state).await {
                tracing::error!(error = %e, "Failed to save checkpoint");
                eprintln!("Failed to save checkpoint: {e}");
                return Ok(5);
            }
        }

        print_report(&report);
        Ok(exit_code(&report))
    }
}

fn print_report(report: &RunReport) {
    println!();
    println!("📊 Ingest Summary:");
    println!("  Run ID: {}", report.state.run_id);
    println!("  Outcome: {}", report.outcome);
    println!("  Rows This Invocation: {}", report.rows_processed);
    println!("  Successful: {}", report.state.success_count);
    println!("  Failed: {}", report.state.failure_count);
    println!("  Downgraded After Write Failure: {}", report.degraded_details);
    println!("  Batches Flushed: {}", report.batches_flushed);
    println!("  Duration: {:.2}s", report.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", report.success_rate());
    println!();

    if !report.issues.is_empty() {
        println!("⚠️  Write failures:");
        for issue in &report.issues {
            println!("  - {:?}: {}", issue.issue_type, issue.message);
            if let Some(context) = &issue.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }
}

/// Map a finished run to the process exit code
pub fn exit_code(report: &RunReport) -> i32 {
    match report.outcome {
        RunOutcome::Interrupted => {
            println!("⚠️  Ingest interrupted gracefully. Progress saved.");
            println!("   Run the same command to resume from checkpoint.");
            tracing::info!("Ingest interrupted by user signal");
            130 // SIGINT exit code (standard Unix convention)
        }
        RunOutcome::AlreadyCompleted => {
            println!("✅ Run already completed - nothing to do.");
            0
        }
        RunOutcome::Completed if report.is_successful() => {
            println!("✅ Ingest completed successfully!");
            0
        }
        RunOutcome::Completed => {
            println!("⚠️  Ingest completed with failures");
            1 // Partial success
        }
    }
}
