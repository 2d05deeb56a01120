use crate::config::types::{
    Config, HubConfig, NavigatorConfig, OutputConfig, TransferConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

const MIN_CHUNK_SIZE: usize = 512;
const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;
const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_hub_config(&config.hub)?;
    validate_navigator_config(&config.navigator)?;
    validate_transfer_config(&config.transfer)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the hub index URL and link filters
fn validate_hub_config(config: &HubConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.index_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid index_url '{}': {}", config.index_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "index_url '{}' must use http or https",
            config.index_url
        )));
    }

    for (name, value) in [
        ("cohort_filter", &config.cohort_filter),
        ("dataset_label", &config.dataset_label),
        ("download_filter", &config.download_filter),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates page loading timings
fn validate_navigator_config(config: &NavigatorConfig) -> Result<(), ConfigError> {
    if config.poll_interval_ms < MIN_POLL_INTERVAL_MS {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be >= {}ms, got {}ms",
            MIN_POLL_INTERVAL_MS, config.poll_interval_ms
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates download settings
fn validate_transfer_config(config: &TransferConfig) -> Result<(), ConfigError> {
    if config.destination_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "destination_dir cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&config.chunk_size) {
        return Err(ConfigError::Validation(format!(
            "chunk_size must be between {} and {} bytes, got {}",
            MIN_CHUNK_SIZE, MAX_CHUNK_SIZE, config.chunk_size
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.summary_path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "summary_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
