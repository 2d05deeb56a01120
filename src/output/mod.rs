//! Output module for run summaries
//!
//! This module handles:
//! - Printing the end-of-run summary to the console
//! - Writing the same summary as a markdown file

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use stats::print_report;
