//! Markdown summary generation
//!
//! This module renders a run report as a markdown document: an overview,
//! per-cohort results, and the transfers that did not complete.

use crate::state::{DatasetOutcome, RunReport};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of the run to `output_path`
///
/// # Arguments
///
/// * `report` - The run report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(std::io::Error)` - Failed to write summary
pub fn write_markdown_report(report: &RunReport, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_report(report);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_report(report: &RunReport) -> String {
    let mut md = String::new();

    md.push_str("# Xena-Harvest Run Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    if let Some(finished) = &report.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = report.duration_seconds() {
        md.push_str(&format!("- **Duration**: {:.1} seconds\n", duration));
    }
    let status = match &report.fatal_error {
        Some(_) => "stopped early",
        None => "completed",
    };
    md.push_str(&format!("- **Status**: {}\n", status));
    if let Some(error) = &report.fatal_error {
        md.push_str(&format!("- **Error**: {}\n", error));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Cohort Links**: {}\n", report.cohorts_found));
    md.push_str(&format!("- **Cohorts Visited**: {}\n", report.cohorts.len()));
    md.push_str(&format!("- **Dataset Links**: {}\n", report.dataset_links()));
    md.push_str(&format!(
        "- **Downloads Succeeded**: {}\n",
        report.downloads_succeeded()
    ));
    md.push_str(&format!(
        "- **Downloads Failed**: {}\n",
        report.downloads_failed()
    ));
    md.push_str(&format!(
        "- **Downloads Timed Out**: {}\n",
        report.downloads_timed_out()
    ));
    md.push_str(&format!(
        "- **Missing Download Links**: {}\n",
        report.missing_download_links()
    ));
    md.push_str(&format!(
        "- **Bytes Written**: {}\n\n",
        report.bytes_downloaded()
    ));

    // Per-cohort table
    if !report.cohorts.is_empty() {
        md.push_str("## Cohorts\n\n");
        md.push_str("| Cohort | Dataset Links | Downloaded | Failed | No Link |\n");
        md.push_str("|--------|---------------|------------|--------|---------|\n");
        for cohort in &report.cohorts {
            let downloaded = cohort.outcomes.iter().filter(|o| o.is_success()).count();
            let failed = cohort.outcomes.iter().filter(|o| o.is_failure()).count();
            let no_link = cohort
                .outcomes
                .iter()
                .filter(|o| matches!(o, DatasetOutcome::NoDownloadLink { .. }))
                .count();
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                cohort.url, cohort.dataset_links, downloaded, failed, no_link
            ));
        }
        md.push('\n');
    }

    // Files
    let files: Vec<&DatasetOutcome> = report
        .cohorts
        .iter()
        .flat_map(|c| c.outcomes.iter())
        .filter(|o| o.is_success())
        .collect();
    if !files.is_empty() {
        md.push_str("## Downloaded Files\n\n");
        for outcome in files {
            if let DatasetOutcome::Downloaded { path, bytes, .. } = outcome {
                md.push_str(&format!("- `{}` ({} bytes)\n", path.display(), bytes));
            }
        }
        md.push('\n');
    }

    // Failures
    let failures: Vec<&DatasetOutcome> = report
        .cohorts
        .iter()
        .flat_map(|c| c.outcomes.iter())
        .filter(|o| o.is_failure())
        .collect();
    if !failures.is_empty() {
        md.push_str("## Failed Transfers\n\n");
        for outcome in failures {
            match outcome {
                DatasetOutcome::TimedOut { file_url, .. } => {
                    md.push_str(&format!("- {}: timed out\n", file_url));
                }
                DatasetOutcome::Failed {
                    file_url, error, ..
                } => {
                    md.push_str(&format!("- {}: {}\n", file_url, error));
                }
                _ => {}
            }
        }
        md.push('\n');
    }

    md
}
