//! Xena-Harvest: a cohort crawler for genomic data hubs
//!
//! This crate walks a data hub's cohort listing, finds dataset pages whose
//! link text matches a label, and streams the compressed data files they
//! point to into a local directory.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for Xena-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Navigation failed: {0}")]
    Navigation(#[from] NavigationError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Page loading errors. Any of these ends the run.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Invalid page URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Could not reach {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("Page load timed out for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} while loading {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read page body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Session is already closed")]
    SessionClosed,
}

/// File transfer errors. These are reported per file and never end the run.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Download of {url} exceeded the {}s time limit", .limit.as_secs())]
    Timeout { url: String, limit: Duration },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot derive a file name from {url}")]
    NoFileName { url: String },
}

impl TransferError {
    /// Returns true if the transfer hit the wall-clock limit
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type alias for Xena-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_harvest, Coordinator};
pub use state::{CohortRecord, DatasetOutcome, RunReport, TransferState};
pub use crate::url::derive_file_name;
