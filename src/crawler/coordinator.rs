//! Harvest coordinator - main crawl orchestration logic
//!
//! This module contains the nested crawl loop:
//! - load the hub index and collect cohort links
//! - per cohort, collect the dataset links matching the label
//! - per dataset link, open the dataset page and take its first download link
//! - hand the download link to the transfer fetcher
//!
//! Everything runs strictly in sequence. A failed transfer is recorded and
//! the loop moves on; a failed page load ends the run.

use crate::config::Config;
use crate::crawler::fetcher::{Downloader, TransferFetcher};
use crate::crawler::navigator::{HttpRenderer, Navigator};
use crate::crawler::parser::{find_links, first_link, Link, LinkPredicate};
use crate::state::{CohortRecord, DatasetOutcome, RunReport};
use crate::{HarvestError, NavigationError, TransferError};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use url::Url;

/// Main harvest coordinator structure
pub struct Coordinator {
    navigator: Navigator,
    downloader: Box<dyn Downloader>,
    index_url: String,
    cohort_filter: LinkPredicate,
    dataset_filter: LinkPredicate,
    download_filter: LinkPredicate,
    dataset_label: String,
    download_filter_text: String,
    destination_dir: PathBuf,
}

impl Coordinator {
    /// Creates a coordinator with the HTTP renderer and transfer fetcher
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - An HTTP client could not be built
    pub fn new(config: Config) -> crate::Result<Self> {
        let renderer = HttpRenderer::new(&config.navigator, &config.user_agent)?;
        let navigator = Navigator::new(Box::new(renderer), &config.navigator);
        let downloader = TransferFetcher::from_config(&config.transfer, &config.user_agent)?;

        Ok(Self::with_components(
            &config,
            navigator,
            Box::new(downloader),
        ))
    }

    /// Creates a coordinator around an existing session and downloader
    pub fn with_components(
        config: &Config,
        navigator: Navigator,
        downloader: Box<dyn Downloader>,
    ) -> Self {
        let hub = &config.hub;

        Self {
            navigator,
            downloader,
            index_url: hub.index_url.clone(),
            cohort_filter: LinkPredicate::href_contains(&hub.cohort_filter),
            dataset_filter: LinkPredicate::text_contains(&hub.dataset_label),
            download_filter: LinkPredicate::href_contains(&hub.download_filter),
            dataset_label: hub.dataset_label.clone(),
            download_filter_text: hub.download_filter.clone(),
            destination_dir: config.transfer.destination_dir.clone(),
        }
    }

    /// Runs the harvest to completion
    ///
    /// Whatever happens inside, the session is closed before this returns,
    /// and the result is a single report. A navigation failure ends the
    /// crawl early and is recorded as the report's fatal error.
    ///
    /// A panic inside the crawl still closes the session first and is then
    /// resumed.
    pub async fn run(mut self) -> RunReport {
        let mut report = RunReport::new();

        let crawled = AssertUnwindSafe(self.crawl(&mut report))
            .catch_unwind()
            .await;

        self.navigator.close().await;

        match crawled {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!("{}", e);
                report.fatal_error = Some(e.to_string());
            }
            Err(panic) => std::panic::resume_unwind(panic),
        }

        report.finish();

        tracing::info!(
            "Harvest finished: {} cohorts visited, {} downloads ok, {} failed",
            report.cohorts.len(),
            report.downloads_succeeded(),
            report.downloads_failed()
        );

        report
    }

    /// Main crawl loop over the cohorts listed on the hub index
    async fn crawl(&mut self, report: &mut RunReport) -> Result<(), HarvestError> {
        let index_url = self.index_url.clone();
        tracing::info!("Loading hub index: {}", index_url);

        let page = self
            .navigator
            .load(&index_url, Some(&self.cohort_filter))
            .await?;

        let cohort_urls: Vec<String> = find_links(&page, &self.cohort_filter)
            .into_iter()
            .map(|link| link.href)
            .collect();

        report.cohorts_found = cohort_urls.len();
        tracing::info!("Found {} cohort links.", cohort_urls.len());

        for cohort_url in cohort_urls {
            let mut record = CohortRecord::new(cohort_url.as_str());
            let result = self.process_cohort(&cohort_url, &mut record).await;
            report.cohorts.push(record);
            result?;
        }

        Ok(())
    }

    /// Processes one cohort page and every dataset link on it
    async fn process_cohort(
        &mut self,
        cohort_url: &str,
        record: &mut CohortRecord,
    ) -> Result<(), NavigationError> {
        tracing::info!("Navigating to cohort page: {}", cohort_url);

        let page = self
            .navigator
            .load(cohort_url, Some(&self.dataset_filter))
            .await?;

        let dataset_links = find_links(&page, &self.dataset_filter);
        record.dataset_links = dataset_links.len();

        tracing::info!(
            "Found {} {} files",
            dataset_links.len(),
            self.dataset_label
        );

        if dataset_links.is_empty() {
            tracing::info!("No {} files found for this cohort.", self.dataset_label);
            return Ok(());
        }

        for link in dataset_links {
            let outcome = self.process_dataset(&link).await?;
            record.outcomes.push(outcome);
        }

        tracing::info!("All downloads are done for this cohort.");
        Ok(())
    }

    /// Opens a dataset page and downloads its first matching file
    async fn process_dataset(&mut self, link: &Link) -> Result<DatasetOutcome, NavigationError> {
        tracing::info!("Found the link. Navigating to {}", link.href);

        let page = self
            .navigator
            .load(&link.href, Some(&self.download_filter))
            .await?;

        let Some(download) = first_link(&page, &self.download_filter) else {
            tracing::info!(
                "There is no {} file at this link...",
                self.download_filter_text
            );
            return Ok(DatasetOutcome::NoDownloadLink {
                dataset_url: link.href.clone(),
            });
        };

        tracing::info!("Download link found: {}", download.href);
        Ok(self.transfer(&link.href, &download.href).await)
    }

    /// Runs one transfer and turns its result into an outcome
    async fn transfer(&self, dataset_url: &str, file_url: &str) -> DatasetOutcome {
        let result = match Url::parse(file_url) {
            Ok(url) => self.downloader.download(&url, &self.destination_dir).await,
            Err(e) => Err(TransferError::Network {
                url: file_url.to_string(),
                message: e.to_string(),
            }),
        };

        match result {
            Ok(outcome) => {
                tracing::info!(
                    "Download is successful: {} ({} bytes)",
                    outcome.path.display(),
                    outcome.bytes_written
                );
                DatasetOutcome::Downloaded {
                    dataset_url: dataset_url.to_string(),
                    file_url: file_url.to_string(),
                    path: outcome.path,
                    bytes: outcome.bytes_written,
                }
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(
                    "Download timed out. The file might be too large or the server is slow: {}",
                    e
                );
                DatasetOutcome::TimedOut {
                    dataset_url: dataset_url.to_string(),
                    file_url: file_url.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!("An error occurred while downloading the file: {}", e);
                DatasetOutcome::Failed {
                    dataset_url: dataset_url.to_string(),
                    file_url: file_url.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Runs a complete harvest
///
/// This function orchestrates the entire process:
///
/// 1. Build the page session and the transfer fetcher
/// 2. Load the hub index and collect cohort links
/// 3. For each cohort, collect dataset links by label
/// 4. For each dataset link, resolve the first download link
/// 5. Stream each file into the destination directory
/// 6. Close the session
///
/// # Arguments
///
/// * `config` - The harvest configuration
///
/// # Returns
///
/// * `Ok(RunReport)` - The run happened; the report says how it went
/// * `Err(HarvestError)` - The run could not start
///
/// # Example
///
/// ```no_run
/// use xena_harvest::config::Config;
/// use xena_harvest::crawler::run_harvest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_harvest(Config::default()).await?;
/// println!("{} files downloaded", report.downloads_succeeded());
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config) -> crate::Result<RunReport> {
    let coordinator = Coordinator::new(config)?;
    Ok(coordinator.run().await)
}
