//! Configuration module for Xena-Harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Without a file the built-in defaults describe the
//! public TCGA hub.
//!
//! # Example
//!
//! ```no_run
//! use xena_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Hub index: {}", config.hub.index_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, HubConfig, NavigatorConfig, OutputConfig, TransferConfig, UserAgentConfig,
    DEFAULT_COHORT_FILTER, DEFAULT_DATASET_LABEL, DEFAULT_DESTINATION_DIR,
    DEFAULT_DOWNLOAD_FILTER, DEFAULT_HUB_INDEX_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
