//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Sluice using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Sluice - Resumable CSV ingestion with per-row audit trail
#[derive(Parser, Debug)]
#[command(name = "sluice")]
#[command(version, about, long_about = None)]
#[command(author = "Sluice Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sluice.toml", env = "SLUICE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SLUICE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a source file into the configured store
    Ingest(commands::ingest::IngestArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Validate a local file without writing anything
    CheckFile(commands::check_file::CheckFileArgs),

    /// Show run checkpoints
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_ingest() {
        let cli = Cli::parse_from(["sluice", "ingest", "--run-id", "R-1"]);
        assert_eq!(cli.config, "sluice.toml");
        match cli.command {
            Commands::Ingest(args) => assert_eq!(args.run_id, "R-1"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_ingest_requires_run_id() {
        assert!(Cli::try_parse_from(["sluice", "ingest"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["sluice", "--config", "custom.toml", "status"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["sluice", "--log-level", "debug", "status"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["sluice", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_check_file() {
        let cli = Cli::parse_from(["sluice", "check-file", "members.csv"]);
        match cli.command {
            Commands::CheckFile(args) => assert_eq!(args.path.to_str(), Some("members.csv")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["sluice", "status", "--run-id", "R-9"]);
        match cli.command {
            Commands::Status(args) => assert_eq!(args.run_id.as_deref(), Some("R-9")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["sluice", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
