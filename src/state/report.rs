//! Run-level bookkeeping: what happened to every cohort and dataset link

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Result of following one dataset link
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetOutcome {
    /// The file was fully written
    Downloaded {
        dataset_url: String,
        file_url: String,
        path: PathBuf,
        bytes: u64,
    },

    /// The dataset page had no link matching the download filter
    NoDownloadLink { dataset_url: String },

    /// The transfer exceeded its wall-clock limit
    TimedOut {
        dataset_url: String,
        file_url: String,
    },

    /// The transfer failed for any other reason
    Failed {
        dataset_url: String,
        file_url: String,
        error: String,
    },
}

impl DatasetOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }

    /// Returns true for a transfer that was attempted and did not finish
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::TimedOut { .. } | Self::Failed { .. })
    }
}

/// Everything found under one cohort page
#[derive(Debug, Clone, PartialEq)]
pub struct CohortRecord {
    /// Cohort page URL
    pub url: String,

    /// Number of dataset links matching the label
    pub dataset_links: usize,

    /// One entry per dataset link actually processed, in discovery order
    pub outcomes: Vec<DatasetOutcome>,
}

impl CohortRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dataset_links: 0,
            outcomes: Vec::new(),
        }
    }

    /// Returns true if the cohort page had no matching dataset link
    pub fn has_no_matches(&self) -> bool {
        self.dataset_links == 0
    }
}

/// Summary of a whole harvest run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Cohort links found on the hub index
    pub cohorts_found: usize,

    /// Cohorts visited, in discovery order
    pub cohorts: Vec<CohortRecord>,

    /// The error that ended the run early, if any
    pub fatal_error: Option<String>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            cohorts_found: 0,
            cohorts: Vec::new(),
            fatal_error: None,
        }
    }

    /// Stamps the finish time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Returns true if every discovered cohort was processed without a fatal error
    pub fn is_complete(&self) -> bool {
        self.fatal_error.is_none() && self.cohorts.len() == self.cohorts_found
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    fn outcomes(&self) -> impl Iterator<Item = &DatasetOutcome> {
        self.cohorts.iter().flat_map(|c| c.outcomes.iter())
    }

    pub fn dataset_links(&self) -> usize {
        self.cohorts.iter().map(|c| c.dataset_links).sum()
    }

    pub fn downloads_succeeded(&self) -> usize {
        self.outcomes().filter(|o| o.is_success()).count()
    }

    /// Attempted transfers that did not complete, timeouts included
    pub fn downloads_failed(&self) -> usize {
        self.outcomes().filter(|o| o.is_failure()).count()
    }

    pub fn downloads_timed_out(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, DatasetOutcome::TimedOut { .. }))
            .count()
    }

    pub fn missing_download_links(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, DatasetOutcome::NoDownloadLink { .. }))
            .count()
    }

    pub fn cohorts_without_matches(&self) -> usize {
        self.cohorts.iter().filter(|c| c.has_no_matches()).count()
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.outcomes()
            .map(|o| match o {
                DatasetOutcome::Downloaded { bytes, .. } => *bytes,
                _ => 0,
            })
            .sum()
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
