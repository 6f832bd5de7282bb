//! Helper functions for CLI operations.
//!
//! Exit codes, output options, remote strategy selection, report notes and
//! progress display.

use std::{
    fs,
    io::{IsTerminal, stderr},
    path::Path
};

use indicatif::{ProgressBar, ProgressStyle};

use super::{convert::convert_format, types::ReportParams};
use crate::{
    cli::Format,
    config::Config,
    coverage::{CoverageReport, DataSource},
    error::{AppResult, output_write_error},
    output::OutputOptions,
    remote::RemoteClient
};

/// Calculates the process exit code from overall coverage.
///
/// - `0` - No threshold, or coverage at or above it
/// - `1` - Coverage below `fail_under`
///
/// # Example
///
/// ```
/// use content_coverage::app::calculate_exit_code;
///
/// assert_eq!(calculate_exit_code(79, Some(80)), 1);
/// assert_eq!(calculate_exit_code(80, Some(80)), 0);
/// assert_eq!(calculate_exit_code(0, None), 0);
/// ```
pub fn calculate_exit_code(percent: u32, fail_under: Option<u32>) -> i32 {
    match fail_under {
        Some(threshold) if percent < threshold => 1,
        _ => 0
    }
}

/// Create output options from parameters
pub fn create_output_options(format: Format, no_color: bool, missing: bool) -> OutputOptions {
    OutputOptions {
        format:       convert_format(format),
        colored:      !no_color,
        show_missing: missing
    }
}

/// Remote client to use for this run, if any.
///
/// Command-line values override the configuration file. Returns `None` when
/// `offline` is set or either credential is missing.
pub fn resolve_remote(params: &ReportParams, config: &Config) -> Option<RemoteClient> {
    if params.offline {
        return None;
    }
    let mut remote = config.remote.clone();
    if let Some(url) = &params.remote_url {
        remote.url = Some(url.clone());
    }
    if let Some(key) = &params.remote_key {
        remote.api_key = Some(key.clone());
    }
    RemoteClient::from_config(&remote, &config.retry)
}

/// Standard notes describing how the numbers were obtained.
pub fn summary_notes(report: &CoverageReport) -> Vec<String> {
    let mut notes = Vec::new();
    match report.source {
        DataSource::Remote => notes.push(format!("Source: {}", report.source)),
        DataSource::Files => {
            notes.push(format!(
                "Source: {} ({} files scanned)",
                report.source, report.files_scanned
            ));
            notes.push(format!(
                "Statements parsed: {}, skipped: {}",
                report.statements_parsed, report.statements_skipped
            ));
            if report.rows_rejected > 0 {
                notes.push(format!(
                    "Rows rejected for column count mismatch: {}",
                    report.rows_rejected
                ));
            }
            if !report.files_failed.is_empty() {
                notes.push(format!(
                    "Unreadable files ({}): {}",
                    report.files_failed.len(),
                    report.files_failed.join(", ")
                ));
            }
        }
    }
    notes
}

/// Write rendered output to `path`.
pub fn write_output(path: &Path, content: &str) -> AppResult<()> {
    fs::write(path, content).map_err(|e| output_write_error(&path.display().to_string(), e))
}

/// Progress bar over `len` files, hidden when stderr is not a terminal.
pub fn create_progress_bar(len: u64, message: &'static str) -> ProgressBar {
    if !stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
    {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb
}
