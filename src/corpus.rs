//! SQL corpus discovery and scanning.
//!
//! Files are scanned independently and in parallel with [`rayon`]: each file
//! is read, comment-stripped, split into `INSERT` statements and parsed.
//! Results keep the sorted file order so [`aggregate`] can fold them
//! serially and reproducibly.

use std::{
    fs, io,
    path::{Path, PathBuf}
};

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{
    catalog::Catalog,
    comments::strip_comments,
    coverage::{CoverageAggregator, CoverageReport},
    error::{AppResult, corpus_error},
    insert::{ParsedInsert, SkipReason, parse_insert_statement},
    statement::extract_insert_statements
};

/// Outcome of parsing one statement span
pub type StatementOutcome = Result<ParsedInsert, SkipReason>;

/// Parse results for one file, or the I/O error that prevented reading it.
#[derive(Debug)]
pub struct FileScan {
    pub path:    PathBuf,
    pub outcome: io::Result<Vec<StatementOutcome>>
}

/// Expand `paths` into the sorted, de-duplicated list of SQL files.
///
/// Files given explicitly are always included. Directories are walked
/// recursively and filtered by `extensions` (ASCII case-insensitive).
pub fn discover_files(paths: &[PathBuf], extensions: &[String]) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            return Err(corpus_error(
                &path.display().to_string(),
                "no such file or directory"
            ));
        }
        for entry in WalkDir::new(path).follow_links(true) {
            let entry = entry.map_err(|e| corpus_error(&path.display().to_string(), e))?;
            if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Parse every `INSERT` statement in one SQL text.
pub fn scan_sql(sql: &str, catalog: &Catalog, table_hint: Option<&str>) -> Vec<StatementOutcome> {
    let cleaned = strip_comments(sql);
    extract_insert_statements(&cleaned)
        .into_iter()
        .map(|span| parse_insert_statement(span, catalog, table_hint))
        .collect()
}

/// Read and parse one file.
pub fn scan_file(path: &Path, catalog: &Catalog) -> FileScan {
    let outcome = fs::read_to_string(path).map(|sql| scan_sql(&sql, catalog, None));
    if let Ok(statements) = &outcome {
        debug!(path = %path.display(), statements = statements.len(), "scanned file");
    }
    FileScan {
        path: path.to_path_buf(),
        outcome
    }
}

/// Scan `files` in parallel, returning results in input order.
pub fn scan_files(
    files: &[PathBuf],
    catalog: &Catalog,
    progress: Option<&ProgressBar>
) -> Vec<FileScan> {
    files
        .par_iter()
        .map(|path| {
            let scan = scan_file(path, catalog);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            scan
        })
        .collect()
}

/// Fold scanned files into a report, in order.
///
/// Unreadable files are logged and listed in `files_failed`; they never
/// abort aggregation.
pub fn aggregate(catalog: &Catalog, scans: &[FileScan], track_missing: bool) -> CoverageReport {
    let mut aggregator = CoverageAggregator::new(catalog).with_missing(track_missing);
    let mut files_scanned = 0;
    let mut files_failed = Vec::new();
    for scan in scans {
        let origin = scan.path.display().to_string();
        match &scan.outcome {
            Ok(statements) => {
                files_scanned += 1;
                for (index, statement) in statements.iter().enumerate() {
                    match statement {
                        Ok(parsed) => aggregator.fold(parsed, &origin, index + 1),
                        Err(reason) => aggregator.skip(reason)
                    }
                }
            }
            Err(e) => {
                warn!(path = %origin, error = %e, "cannot read file, skipping");
                files_failed.push(origin);
            }
        }
    }
    let mut report = aggregator.finish();
    report.files_scanned = files_scanned;
    report.files_failed = files_failed;
    report
}

/// Up to `limit` parsed statements for `table`, read lazily in file order.
pub fn sample_statements(
    files: &[PathBuf],
    catalog: &Catalog,
    table: &str,
    limit: usize
) -> Vec<(PathBuf, ParsedInsert)> {
    let mut samples = Vec::new();
    for path in files {
        if samples.len() >= limit {
            break;
        }
        let Ok(sql) = fs::read_to_string(path) else {
            continue;
        };
        let remaining = limit - samples.len();
        samples.extend(
            scan_sql(&sql, catalog, Some(table))
                .into_iter()
                .filter_map(Result::ok)
                .map(|parsed| (path.clone(), parsed))
                .take(remaining)
        );
    }
    samples
}
