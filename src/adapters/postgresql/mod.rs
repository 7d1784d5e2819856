//! PostgreSQL storage
//!
//! Records, row details, run summaries and checkpoints live in four tables
//! created by `migrations/001_initial_schema.sql`.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::{PostgreSQLDetail, PostgreSQLRunState};
