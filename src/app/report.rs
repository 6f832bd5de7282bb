//! Report and tables command execution.
//!
//! `run_report` orchestrates one coverage run:
//!
//! 1. **Catalog**: configured tables, or the built-in default
//! 2. **Remote** (optional): fetch every table from the data store
//! 3. **Files**: discover, scan in parallel, fold in path order
//! 4. **Notes and rendering**: describe the source, counters and fallbacks

use tracing::{info, warn};

use super::{
    helpers::{
        calculate_exit_code, create_output_options, create_progress_bar, resolve_remote,
        summary_notes
    },
    types::{ReportParams, ReportResult}
};
use crate::{
    catalog::Catalog,
    cli::Format,
    config::Config,
    corpus::{aggregate, discover_files, sample_statements, scan_files},
    coverage::CoverageReport,
    error::{AppResult, config_error, corpus_error},
    output::{format_catalog, format_report, format_samples}
};

/// Executes a coverage run.
///
/// # Errors
///
/// Returns an error if:
/// - The configured catalog is invalid
/// - An input path does not exist
/// - `strict` is set and a file cannot be read
/// - `debug_table` names a table outside the catalog
///
/// A failing remote store is not an error; the run falls back to the files.
///
/// # Example
///
/// ```no_run
/// use std::path::PathBuf;
///
/// use content_coverage::{
///     app::{ReportParams, run_report},
///     cli::Format,
///     config::Config
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = ReportParams {
///     paths:         vec![PathBuf::from("supabase/seeds")],
///     missing:       false,
///     debug_table:   None,
///     debug_limit:   5,
///     output_format: Format::Markdown,
///     offline:       true,
///     remote_url:    None,
///     remote_key:    None,
///     fail_under:    None,
///     strict:        false,
///     no_color:      true
/// };
///
/// let result = run_report(params, Config::default()).await?;
/// println!("{}", result.rendered);
/// # Ok(())
/// # }
/// ```
pub async fn run_report(params: ReportParams, config: Config) -> AppResult<ReportResult> {
    let catalog = config.catalog()?;
    let output_opts =
        create_output_options(params.output_format, params.no_color, params.missing);

    let mut fallback_note = None;
    let mut remote_report = None;
    if let Some(client) = resolve_remote(&params, &config) {
        info!(tables = catalog.len(), "computing coverage from remote data store");
        match client.coverage(&catalog, params.missing).await {
            Ok(report) => remote_report = Some(report),
            Err(e) => {
                let reason = e.render_message();
                warn!(error = %reason, "remote data store failed, falling back to SQL files");
                fallback_note = Some(format!(
                    "Remote data store unavailable ({}); coverage computed from SQL files",
                    reason
                ));
            }
        }
    }

    let mut report = match remote_report {
        Some(report) => report,
        None => scan_report(&params, &config, &catalog)?
    };
    report.notes.extend(fallback_note);
    report.notes.extend(summary_notes(&report));
    info!(
        total = report.total,
        complete = report.complete,
        percent = report.percent,
        "coverage computed"
    );

    let debug_output = match &params.debug_table {
        Some(table) => Some(debug_samples(&params, &config, &catalog, table)?),
        None => None
    };

    Ok(ReportResult {
        exit_code: calculate_exit_code(report.percent, params.fail_under),
        rendered: format_report(&report, &output_opts),
        debug_output,
        report
    })
}

fn scan_report(
    params: &ReportParams,
    config: &Config,
    catalog: &Catalog
) -> AppResult<CoverageReport> {
    let files = discover_files(&params.paths, &config.scan.extensions)?;
    info!(files = files.len(), "computing coverage from SQL files");

    let pb = create_progress_bar(files.len() as u64, "Scanning SQL files");
    let scans = scan_files(&files, catalog, Some(&pb));
    pb.finish_and_clear();

    let report = aggregate(catalog, &scans, params.missing);
    if params.strict
        && let Some(first) = report.files_failed.first()
    {
        return Err(corpus_error(first, "file could not be read (--strict)"));
    }
    Ok(report)
}

fn debug_samples(
    params: &ReportParams,
    config: &Config,
    catalog: &Catalog,
    table: &str
) -> AppResult<String> {
    let id = catalog.lookup(table).ok_or_else(|| {
        config_error(format!("Unknown table '{}' for --debug-table", table))
    })?;
    let table = &catalog.get(id).table;
    let files = discover_files(&params.paths, &config.scan.extensions)?;
    let samples = sample_statements(&files, catalog, table, params.debug_limit);
    Ok(format_samples(table, &samples, params.debug_limit))
}

/// Render the effective catalog.
pub fn run_tables(config: &Config, format: Format, no_color: bool) -> AppResult<String> {
    let catalog = config.catalog()?;
    let opts = create_output_options(format, no_color, false);
    Ok(format_catalog(&catalog, &opts))
}
