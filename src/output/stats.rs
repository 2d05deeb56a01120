//! Console summary of a harvest run

use crate::state::{DatasetOutcome, RunReport};

/// Prints the run report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_report(report: &RunReport) {
    println!("=== Harvest Summary ===\n");

    println!("Overview:");
    println!("  Cohort links found: {}", report.cohorts_found);
    println!("  Cohorts visited: {}", report.cohorts.len());
    println!(
        "  Cohorts without matching datasets: {}",
        report.cohorts_without_matches()
    );
    println!("  Dataset links found: {}", report.dataset_links());
    if let Some(duration) = report.duration_seconds() {
        println!("  Duration: {:.1}s", duration);
    }
    println!();

    println!("Downloads:");
    println!("  Succeeded: {}", report.downloads_succeeded());
    println!(
        "  Failed: {} ({} timed out)",
        report.downloads_failed(),
        report.downloads_timed_out()
    );
    println!(
        "  Dataset pages without a download link: {}",
        report.missing_download_links()
    );
    println!("  Bytes written: {}", report.bytes_downloaded());

    let failures: Vec<&DatasetOutcome> = report
        .cohorts
        .iter()
        .flat_map(|c| c.outcomes.iter())
        .filter(|o| o.is_failure())
        .collect();

    if !failures.is_empty() {
        println!();
        println!("Failed Transfers:");
        for outcome in failures {
            match outcome {
                DatasetOutcome::TimedOut { file_url, .. } => {
                    println!("  {}: timed out", file_url)
                }
                DatasetOutcome::Failed {
                    file_url, error, ..
                } => println!("  {}: {}", file_url, error),
                _ => {}
            }
        }
    }

    if let Some(error) = &report.fatal_error {
        println!();
        println!("Run stopped early: {}", error);
    }
}
