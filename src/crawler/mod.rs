//! Crawler module for hub navigation and file transfer
//!
//! This module contains the core harvesting logic, including:
//! - Page loading with a wait-until-links-appear settle strategy
//! - HTML link extraction by href or visible text
//! - Chunked file transfer with progress reporting
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod navigator;
mod parser;

pub use coordinator::{run_harvest, Coordinator};
pub use fetcher::{
    log_progress, stream_to_writer, Downloader, ProgressCallback, TransferFetcher,
    TransferOutcome,
};
pub use navigator::{build_http_client, HttpRenderer, Navigator, PageRenderer};
pub use parser::{find_links, first_link, Link, LinkPredicate, RenderedPage};
