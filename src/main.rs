//! Xena-Harvest main entry point
//!
//! This is the command-line interface for the Xena-Harvest cohort crawler.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use xena_harvest::config::{load_config_with_hash, Config};
use xena_harvest::crawler::run_harvest;
use xena_harvest::output::{print_report, write_markdown_report};
use xena_harvest::HarvestError;

/// Xena-Harvest: a cohort crawler for genomic data hubs
///
/// Walks the hub's cohort pages, finds the dataset links matching the
/// configured label and downloads their compressed data files. With no
/// arguments it harvests the IlluminaHiSeq pancan normalized files of the
/// public TCGA hub into ./DownloadedFiles.
#[derive(Parser, Debug)]
#[command(name = "xena-harvest")]
#[command(version)]
#[command(about = "A cohort crawler for genomic data hubs", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the effective configuration without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(HarvestError::Config(e).into());
                }
            }
        }
        None => Config::default(),
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("xena_harvest=info,warn"),
            1 => EnvFilter::new("xena_harvest=debug,info"),
            2 => EnvFilter::new("xena_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Xena-Harvest Dry Run ===\n");

    println!("Hub:");
    println!("  Index URL: {}", config.hub.index_url);
    println!("  Cohort links containing: {}", config.hub.cohort_filter);
    println!("  Dataset links labelled: {}", config.hub.dataset_label);
    println!("  Download links containing: {}", config.hub.download_filter);

    println!("\nNavigator:");
    println!("  Settle timeout: {}ms", config.navigator.settle_timeout_ms);
    println!("  Poll interval: {}ms", config.navigator.poll_interval_ms);
    println!(
        "  Request timeout: {}s",
        config.navigator.request_timeout_secs
    );

    println!("\nTransfer:");
    println!(
        "  Destination: {}",
        config.transfer.destination_dir.display()
    );
    println!("  Timeout: {}s", config.transfer.timeout_secs);
    println!("  Chunk size: {} bytes", config.transfer.chunk_size);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    if let Some(path) = &config.output.summary_path {
        println!("\nSummary: {}", path.display());
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
///
/// Per-file failures and a run stopped by a navigation error are reported,
/// not turned into a failing exit status.
async fn handle_harvest(config: Config) -> anyhow::Result<()> {
    let summary_path = config.output.summary_path.clone();

    tracing::info!("Starting harvest of {}", config.hub.index_url);
    tracing::info!(
        "Saving files to: {}",
        config.transfer.destination_dir.display()
    );

    let report = run_harvest(config).await?;

    match &report.fatal_error {
        None => tracing::info!("Harvest completed"),
        Some(e) => tracing::error!("Harvest stopped early: {}", e),
    }

    println!();
    print_report(&report);

    if let Some(path) = summary_path {
        match write_markdown_report(&report, &path) {
            Ok(()) => tracing::info!("Summary written to: {}", path.display()),
            Err(e) => tracing::error!("Failed to write summary {}: {}", path.display(), e),
        }
    }

    Ok(())
}
