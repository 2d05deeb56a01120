use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Hub index page of the public TCGA hub
pub const DEFAULT_HUB_INDEX_URL: &str =
    "https://xenabrowser.net/datapages/?hub=https://tcga.xenahubs.net:443";

/// Substring every cohort link's href contains
pub const DEFAULT_COHORT_FILTER: &str = "cohort=TCGA";

/// Substring of the visible text of the dataset links to follow
pub const DEFAULT_DATASET_LABEL: &str = "IlluminaHiSeq pancan normalized";

/// Substring of the href of the file to download on a dataset page
pub const DEFAULT_DOWNLOAD_FILTER: &str = ".gz";

/// Directory (relative to the working directory) receiving the files
pub const DEFAULT_DESTINATION_DIR: &str = "DownloadedFiles";

/// Main configuration structure for Xena-Harvest
///
/// Every section is optional; a missing section or key falls back to the
/// built-in TCGA defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hub: HubConfig,
    pub navigator: NavigatorConfig,
    pub transfer: TransferConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// What to crawl and which links to follow
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HubConfig {
    /// The hub index page listing all cohorts
    pub index_url: String,

    /// Href substring identifying cohort links on the index page
    pub cohort_filter: String,

    /// Visible-text substring identifying dataset links on a cohort page
    pub dataset_label: String,

    /// Href substring identifying the download link on a dataset page
    pub download_filter: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_HUB_INDEX_URL.to_string(),
            cohort_filter: DEFAULT_COHORT_FILTER.to_string(),
            dataset_label: DEFAULT_DATASET_LABEL.to_string(),
            download_filter: DEFAULT_DOWNLOAD_FILTER.to_string(),
        }
    }
}

/// Page loading behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NavigatorConfig {
    /// Longest time to wait for a page to show the links we expect (milliseconds)
    pub settle_timeout_ms: u64,

    /// Delay between re-renders while waiting (milliseconds)
    pub poll_interval_ms: u64,

    /// Timeout for a single page request (seconds)
    pub request_timeout_secs: u64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            settle_timeout_ms: 5_000,
            poll_interval_ms: 500,
            request_timeout_secs: 30,
        }
    }
}

impl NavigatorConfig {
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// File download behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TransferConfig {
    /// Where downloaded files are written
    pub destination_dir: PathBuf,

    /// Wall-clock limit for one whole file transfer (seconds)
    pub timeout_secs: u64,

    /// Bytes written (and reported) per progress step
    pub chunk_size: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            destination_dir: PathBuf::from(DEFAULT_DESTINATION_DIR),
            timeout_secs: 600,
            chunk_size: 8 * 1024,
        }
    }
}

impl TransferConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Optional path of a markdown run summary
    pub summary_path: Option<PathBuf>,
}
