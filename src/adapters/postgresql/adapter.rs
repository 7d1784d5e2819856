//! PostgreSQL adapter implementing the storage traits
//!
//! Each `transact_put` runs in one transaction of plain `INSERT`s. The primary
//! keys provide the conditional check: a unique violation aborts the whole
//! transaction and is reported as `DuplicateKey`.

use crate::adapters::database::traits::{AtomicWriter, StateStorage, WriteBatchBounds};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{PostgreSQLDetail, PostgreSQLRunState};
use crate::core::state::run_state::RunState;
use crate::domain::errors::WriteError;
use crate::domain::ids::RunId;
use crate::domain::{Detail, Record, Result, SluiceError, SummaryResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::error::SqlState;

const INSERT_RECORD: &str = r#"
    INSERT INTO records (
        insurer_number, insured_number, holder_name, address,
        birth_date, valid_from, valid_until, run_id, row_ordinal
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
"#;

const INSERT_SUMMARY: &str = r#"
    INSERT INTO run_summaries (
        run_id, first_record_key, source_key, status, error_message,
        success_count, failure_count, created_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

const INSERT_DETAIL: &str = r#"
    INSERT INTO row_details (run_id, row_ordinal, status, violations, created_at)
    VALUES ($1, $2, $3, $4, $5)
"#;

const UPSERT_RUN: &str = r#"
    INSERT INTO ingest_runs (
        run_id, next_row, completed, success_count, failure_count,
        first_record_key, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (run_id) DO UPDATE SET
        next_row = EXCLUDED.next_row,
        completed = EXCLUDED.completed,
        success_count = EXCLUDED.success_count,
        failure_count = EXCLUDED.failure_count,
        first_record_key = EXCLUDED.first_record_key,
        updated_at = EXCLUDED.updated_at
"#;

/// Maps a driver error raised while writing `table`
fn classify(table: &'static str, error: tokio_postgres::Error) -> WriteError {
    match error.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
            WriteError::duplicate(table, error.to_string())
        }
        _ => WriteError::transient(table, error.to_string()),
    }
}

fn transient(error: impl std::fmt::Display) -> WriteError {
    WriteError::transient(WriteError::ALL_TABLES, error.to_string())
}

/// PostgreSQL implementation of the storage traits
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Create a new PostgreSQL adapter with an Arc-wrapped client
    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

#[async_trait]
impl AtomicWriter for PostgreSQLAdapter {
    async fn transact_put(
        &self,
        records: &[Record],
        summary: Option<&SummaryResult>,
        details: &[Detail],
    ) -> std::result::Result<(), WriteError> {
        WriteBatchBounds::of(records, summary, details).check()?;

        let detail_rows = details
            .iter()
            .map(PostgreSQLDetail::from_domain)
            .collect::<Result<Vec<_>>>()
            .map_err(transient)?;

        let mut conn = self.client.get_connection().await.map_err(transient)?;
        let tx = conn.transaction().await.map_err(transient)?;
        tx.batch_execute(&self.client.statement_timeout_sql())
            .await
            .map_err(transient)?;

        for record in records {
            let row_ordinal = i64::try_from(record.row_ordinal).map_err(transient)?;
            tx.execute(
                INSERT_RECORD,
                &[
                    &record.insurer_number,
                    &record.insured_number,
                    &record.holder_name,
                    &record.address,
                    &record.birth_date,
                    &record.valid_from,
                    &record.valid_until,
                    &record.run_id.as_str(),
                    &row_ordinal,
                ],
            )
            .await
            .map_err(|e| classify("records", e))?;
        }

        if let Some(summary) = summary {
            let success_count = i64::try_from(summary.success_count).map_err(transient)?;
            let failure_count = i64::try_from(summary.failure_count).map_err(transient)?;
            tx.execute(
                INSERT_SUMMARY,
                &[
                    &summary.run_id.as_str(),
                    &summary.first_record_key,
                    &summary.source_key.as_str(),
                    &summary.status.as_str(),
                    &summary.error_message,
                    &success_count,
                    &failure_count,
                    &summary.created_at,
                ],
            )
            .await
            .map_err(|e| classify("run_summaries", e))?;
        }

        for row in &detail_rows {
            tx.execute(
                INSERT_DETAIL,
                &[
                    &row.run_id,
                    &row.row_ordinal,
                    &row.status,
                    &row.violations,
                    &row.created_at,
                ],
            )
            .await
            .map_err(|e| classify("row_details", e))?;
        }

        tx.commit().await.map_err(transient)?;

        tracing::debug!(
            records = records.len(),
            summary = summary.is_some(),
            details = details.len(),
            "PostgreSQL transaction committed"
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgresql"
    }
}

#[async_trait]
impl StateStorage for PostgreSQLAdapter {
    async fn load_run_state(&self, run_id: &RunId) -> Result<Option<RunState>> {
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_opt("SELECT * FROM ingest_runs WHERE run_id = $1", &[&run_id.as_str()])
            .await
            .map_err(|e| SluiceError::State(format!("Failed to load checkpoint: {}", e)))?;

        match row {
            Some(row) => Ok(Some(PostgreSQLRunState::from_row(&row).to_domain()?)),
            None => {
                tracing::debug!(run_id = %run_id, "No checkpoint found in PostgreSQL");
                Ok(None)
            }
        }
    }

    async fn save_run_state(&self, state: &RunState) -> Result<()> {
        let row = PostgreSQLRunState::from_domain(state)?;
        let conn = self.client.get_connection().await?;

        conn.execute(
            UPSERT_RUN,
            &[
                &row.run_id,
                &row.next_row,
                &row.completed,
                &row.success_count,
                &row.failure_count,
                &row.first_record_key,
                &row.updated_at,
            ],
        )
        .await
        .map_err(|e| SluiceError::State(format!("Failed to save checkpoint: {}", e)))?;

        tracing::debug!(run_id = %state.run_id, "Checkpoint saved to PostgreSQL");
        Ok(())
    }

    async fn list_run_states(&self) -> Result<Vec<RunState>> {
        let conn = self.client.get_connection().await?;
        let rows = conn
            .query("SELECT * FROM ingest_runs ORDER BY run_id", &[])
            .await
            .map_err(|e| SluiceError::State(format!("Failed to list checkpoints: {}", e)))?;

        rows.iter()
            .map(|row| PostgreSQLRunState::from_row(row).to_domain())
            .collect()
    }
}
