//! Integration tests for dry-run mode
//!
//! These tests verify that dry-run storage keeps every write and checkpoint
//! in memory while the ingestion itself runs normally.

use sluice::adapters::database::create_storage;
use sluice::adapters::rows::CsvRowSource;
use sluice::adapters::source::create_source_storage;
use sluice::config::parse_config;
use sluice::core::ingest::{IngestCoordinator, IngestSettings, RunOutcome};
use sluice::core::state::StateManager;
use sluice::domain::ids::{RunId, SourceKey};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

fn postgres_config(source_dir: &Path, state_dir: &Path) -> sluice::config::SluiceConfig {
    // Nothing listens on this port; a dry run must never connect
    parse_config(&format!(
        r#"
database_target = "postgresql"

[application]
dry_run = true

[source]
location = "{}"
key = "members.csv"

[postgresql]
connection_string = "postgresql://sluice:pw@127.0.0.1:1/sluice"

[state]
directory = "{}"

[logging]
local_enabled = false
"#,
        source_dir.display(),
        state_dir.display()
    ))
    .unwrap()
}

#[tokio::test]
async fn test_dry_run_never_connects() {
    let source_dir = TempDir::new().unwrap();
    let state_dir = TempDir::new().unwrap();
    let config = postgres_config(source_dir.path(), state_dir.path());

    let handles = create_storage(&config, config.application.dry_run)
        .await
        .unwrap();
    assert_eq!(handles.writer.backend_name(), "memory");
}

#[tokio::test]
async fn test_dry_run_ingest_leaves_no_checkpoint_on_disk() {
    let source_dir = TempDir::new().unwrap();
    let state_dir = TempDir::new().unwrap();
    std::fs::write(
        source_dir.path().join("members.csv"),
        "insurer,insured,name,address,birth,from,until\n\
         123456,0000000001,Hanako,Tokyo,1980-01-01,2024-04-01,2025-03-31\n\
         123456,0000000002,Taro,Osaka,not-a-date,2024-04-01,2025-03-31\n",
    )
    .unwrap();

    let config = postgres_config(source_dir.path(), state_dir.path());
    let handles = create_storage(&config, true).await.unwrap();
    let state_manager = StateManager::new_with_storage(handles.state);

    let coordinator = IngestCoordinator::new(
        IngestSettings::from_config(&config.ingest, SourceKey::new("members.csv").unwrap()),
        create_source_storage(&config.source).unwrap(),
        Arc::new(CsvRowSource::from_config(&config.source.csv).unwrap()),
        handles.writer,
    );

    let run_id = RunId::new("DRY-1").unwrap();
    let state = state_manager.load_or_new(&run_id).await.unwrap();
    let (_tx, rx) = watch::channel(false);
    let report = coordinator.run(state, rx).await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.state.success_count, 1);
    assert_eq!(report.state.failure_count, 1);

    state_manager.save_run_state(&report.state).await.unwrap();
    let saved = state_manager.load_run_state(&run_id).await.unwrap().unwrap();
    assert!(saved.completed);

    assert!(std::fs::read_dir(state_dir.path()).unwrap().next().is_none());
}
