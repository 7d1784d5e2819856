//! Integration tests for graceful shutdown functionality
//!
//! These tests verify that:
//! - Shutdown signals are properly handled
//! - Checkpoints are saved correctly on shutdown
//! - Runs can resume from interrupted state
//! - No row is written twice across an interruption

use async_trait::async_trait;
use sluice::adapters::database::traits::AtomicWriter;
use sluice::adapters::memory::MemoryStore;
use sluice::adapters::rows::CsvRowSource;
use sluice::adapters::source::LocalSource;
use sluice::adapters::state_file::FileStateStorage;
use sluice::core::ingest::{IngestCoordinator, IngestSettings, RunOutcome};
use sluice::core::state::StateManager;
use sluice::core::validation::RowSchema;
use sluice::domain::errors::WriteError;
use sluice::domain::ids::{RunId, SourceKey};
use sluice::domain::{Detail, Record, SummaryResult};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

/// Writer that raises the shutdown flag on its first write
struct SignalOnWrite {
    inner: Arc<MemoryStore>,
    shutdown_tx: watch::Sender<bool>,
}

#[async_trait]
impl AtomicWriter for SignalOnWrite {
    async fn transact_put(
        &self,
        records: &[Record],
        summary: Option<&SummaryResult>,
        details: &[Detail],
    ) -> Result<(), WriteError> {
        let _ = self.shutdown_tx.send(true);
        self.inner.transact_put(records, summary, details).await
    }

    fn backend_name(&self) -> &'static str {
        "signal-on-write"
    }
}

fn write_rows(dir: &TempDir, count: u64) {
    let mut contents = String::from("insurer,insured,name,address,birth,from,until\n");
    for i in 1..=count {
        contents.push_str(&format!(
            "654321,{i:010},Holder,Sapporo,1990-02-03,2024-04-01,2025-03-31\n"
        ));
    }
    std::fs::write(dir.path().join("members.csv"), contents).unwrap();
}

fn coordinator(
    dir: &TempDir,
    writer: Arc<dyn AtomicWriter>,
    batch_ceiling: usize,
) -> IngestCoordinator {
    IngestCoordinator::new(
        IngestSettings {
            source_key: SourceKey::new("members.csv").unwrap(),
            batch_ceiling,
            finalize_on_cancel: false,
            schema: RowSchema::standard(),
        },
        Arc::new(LocalSource::new(dir.path())),
        Arc::new(CsvRowSource::default()),
        writer,
    )
}

#[tokio::test]
async fn test_shutdown_signal_channel_creation() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    assert!(!*shutdown_rx.borrow());
    shutdown_tx.send(true).unwrap();
    assert!(*shutdown_rx.borrow());
}

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    shutdown_tx.send(true).unwrap();

    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}

#[tokio::test]
async fn test_signal_before_start_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write_rows(&dir, 5);
    let store = Arc::new(MemoryStore::new());
    let (_shutdown_tx, shutdown_rx) = watch::channel(true);

    let report = coordinator(&dir, store.clone(), 100)
        .run(
            sluice::core::state::RunState::new(RunId::new("R-1").unwrap()),
            shutdown_rx,
        )
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Interrupted);
    assert_eq!(report.rows_processed, 0);
    assert_eq!(report.state.next_row, 1);
    assert_eq!(store.record_count().await, 0);
}

#[tokio::test]
async fn test_graceful_shutdown_simulation() {
    let source_dir = TempDir::new().unwrap();
    let state_dir = TempDir::new().unwrap();
    write_rows(&source_dir, 45);

    let run_id = RunId::new("R-2025-05").unwrap();
    let store = Arc::new(MemoryStore::new());

    // First process: interrupted after the first batch of 20
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let writer = Arc::new(SignalOnWrite {
            inner: store.clone(),
            shutdown_tx,
        });
        let state_manager =
            StateManager::new_with_storage(Arc::new(FileStateStorage::new(state_dir.path())));
        let state = state_manager.load_or_new(&run_id).await.unwrap();

        let report = coordinator(&source_dir, writer, 20)
            .run(state, shutdown_rx)
            .await
            .unwrap();

        assert_eq!(report.outcome, RunOutcome::Interrupted);
        assert_eq!(report.state.next_row, 21);
        state_manager.save_run_state(&report.state).await.unwrap();
    }

    // Second process: picks up the checkpoint from disk
    let state_manager =
        StateManager::new_with_storage(Arc::new(FileStateStorage::new(state_dir.path())));
    let state = state_manager.load_run_state(&run_id).await.unwrap().unwrap();
    assert!(!state.completed);
    assert_eq!(state.success_count, 20);

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let report = coordinator(&source_dir, store.clone(), 20)
        .run(state, shutdown_rx)
        .await
        .unwrap();
    state_manager.save_run_state(&report.state).await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.rows_processed, 25);
    assert_eq!(store.record_count().await, 45);
    assert_eq!(store.details(&run_id).await.len(), 45);

    let summary = store.summary(&run_id).await.unwrap();
    assert_eq!(summary.success_count, 45);
    assert_eq!(summary.failure_count, 0);

    let saved = state_manager.load_run_state(&run_id).await.unwrap().unwrap();
    assert!(saved.completed);
    assert_eq!(saved.next_row, 46);
}
