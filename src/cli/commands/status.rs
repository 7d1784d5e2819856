//! Status command implementation
//!
//! This module implements the `status` command for displaying run
//! checkpoints.

use crate::adapters::database::create_state_storage;
use crate::config::load_config;
use crate::core::state::{RunState, StateManager};
use crate::domain::ids::RunId;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show a single run
    #[arg(long)]
    pub run_id: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking run status");

        println!("📊 Run Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let state_storage = match create_state_storage(&config).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to open checkpoint storage");
                println!("   Error: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let state_manager = StateManager::new_with_storage(state_storage);

        let states = match &self.run_id {
            Some(run_id) => {
                let run_id = match RunId::new(run_id.as_str()) {
                    Ok(id) => id,
                    Err(e) => {
                        println!("❌ Invalid run id: {e}");
                        return Ok(2);
                    }
                };
                state_manager.load_run_state(&run_id).await.map(|s| s.into_iter().collect())
            }
            None => state_manager.list_run_states().await,
        };

        let states: Vec<RunState> = match states {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to load checkpoints");
                println!("   Error: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        if states.is_empty() {
            println!("No runs found.");
            println!("Run 'sluice ingest --run-id <ID>' to start one.");
            return Ok(0);
        }

        println!("Found {} run(s):", states.len());
        println!();
        println!(
            "{:<38} {:<16} {:>10} {:>10} {:>10} {:<20}",
            "Run ID", "Status", "Next Row", "Success", "Failure", "Updated"
        );
        println!("{}", "-".repeat(110));

        for state in &states {
            println!(
                "{:<38} {:<16} {:>10} {:>10} {:>10} {:<20}",
                state.run_id.as_str(),
                status_label(state),
                state.next_row,
                state.success_count,
                state.failure_count,
                state.updated_at.format("%Y-%m-%d %H:%M:%S")
            );
        }

        println!();
        Ok(0)
    }
}

fn status_label(state: &RunState) -> &'static str {
    if state.completed {
        "✅ Completed"
    } else if state.rows_processed() > 0 {
        "🔄 Resumable"
    } else {
        "⏸️  Not Started"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::RunStateBuilder;

    #[test]
    fn test_status_args_defaults() {
        let args = StatusArgs { run_id: None };
        assert!(args.run_id.is_none());
    }

    #[test]
    fn test_status_label() {
        let run_id = RunId::new("R-1").unwrap();
        assert_eq!(
            status_label(&RunStateBuilder::new(run_id.clone()).build()),
            "⏸️  Not Started"
        );
        assert_eq!(
            status_label(&RunStateBuilder::new(run_id.clone()).next_row(4).success_count(3).build()),
            "🔄 Resumable"
        );
        assert_eq!(
            status_label(&RunStateBuilder::new(run_id).completed(true).build()),
            "✅ Completed"
        );
    }
}
