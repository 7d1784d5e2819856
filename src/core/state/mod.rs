// Run checkpoints and resume decisions

pub mod manager;
pub mod resume;
pub mod run_state;

pub use manager::StateManager;
pub use resume::ResumeDecision;
pub use run_state::{RunState, RunStateBuilder};
