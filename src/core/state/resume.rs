//! Resume controller
//!
//! Decides, from a checkpoint, whether a run has anything left to do and how
//! many rows of the source must be skipped before processing resumes.

use super::run_state::RunState;

/// What an invocation should do with a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeDecision {
    /// The run already finished; nothing may be written
    AlreadyCompleted,

    /// Process rows, skipping `skip` rows first
    Resume {
        /// Rows to consume from the stream before the loop starts
        skip: u64,
        /// Ordinal assigned to the first row after the skip
        first_ordinal: u64,
    },
}

impl ResumeDecision {
    /// Computes the decision for a checkpoint
    ///
    /// A `next_row` of 0 is treated as 1 so a zeroed checkpoint starts from
    /// the beginning of the file.
    pub fn for_state(state: &RunState) -> Self {
        if state.completed {
            return ResumeDecision::AlreadyCompleted;
        }

        let first_ordinal = state.next_row.max(1);
        ResumeDecision::Resume {
            skip: first_ordinal - 1,
            first_ordinal,
        }
    }
}
