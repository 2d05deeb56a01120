//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `TransferState`: byte counters for the file currently being downloaded
//! - `DatasetOutcome`: what happened to one dataset link
//! - `CohortRecord`: the outcomes gathered under one cohort page
//! - `RunReport`: the whole run, including the error that ended it early

mod report;
mod transfer_state;

// Re-export main types
pub use report::{CohortRecord, DatasetOutcome, RunReport};
pub use transfer_state::TransferState;
