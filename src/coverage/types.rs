//! Coverage result types.

use std::fmt;

use compact_str::CompactString;
use serde::Serialize;

use crate::catalog::TableSpec;

/// Percentage of `complete` over `total`, rounded; 0 when `total` is 0.
pub fn percent(complete: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((complete as f64 / total as f64) * 100.0).round() as u32
}

/// Running row counters for one tracked table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageRow {
    pub label:           String,
    pub table:           CompactString,
    pub required_fields: Vec<CompactString>,
    pub total:           u64,
    pub complete:        u64
}

impl CoverageRow {
    pub fn empty(spec: &TableSpec) -> Self {
        Self {
            label:           spec.label.clone(),
            table:           spec.table.clone(),
            required_fields: spec.required_fields.clone(),
            total:           0,
            complete:        0
        }
    }

    /// Count `multiplicity` rows that share one completeness verdict.
    pub fn add(&mut self, multiplicity: u64, complete: bool) {
        self.total += multiplicity;
        if complete {
            self.complete += multiplicity;
        }
    }

    pub fn percent(&self) -> u32 {
        percent(self.complete, self.total)
    }
}

/// Where coverage numbers were computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// SQL files parsed locally
    Files,
    /// Rows fetched from the remote store
    Remote
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Files => write!(f, "SQL files"),
            Self::Remote => write!(f, "remote data store")
        }
    }
}

/// Required fields missing from one row (or one bulk statement).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingFields {
    pub table:        CompactString,
    /// File path, or the remote table endpoint
    pub origin:       String,
    /// One-based statement number within `origin` (page row for remote)
    pub statement:    usize,
    /// One-based row number within the statement
    pub row:          usize,
    /// Rows this verdict stands for (parent total for bulk SELECT inserts)
    pub multiplicity: u64,
    pub missing:      Vec<CompactString>
}

/// Everything a report renders.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub source:             DataSource,
    pub rows:               Vec<CoverageRow>,
    pub total:              u64,
    pub complete:           u64,
    pub percent:            u32,
    pub statements_parsed:  usize,
    pub statements_skipped: usize,
    pub rows_rejected:      usize,
    pub files_scanned:      usize,
    pub files_failed:       Vec<String>,
    pub notes:              Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing:            Vec<MissingFields>
}

impl CoverageReport {
    /// Report over `rows` with overall totals computed from their sums.
    pub fn new(source: DataSource, rows: Vec<CoverageRow>) -> Self {
        let total = rows.iter().map(|r| r.total).sum();
        let complete = rows.iter().map(|r| r.complete).sum();
        Self {
            source,
            rows,
            total,
            complete,
            percent: percent(complete, total),
            statements_parsed: 0,
            statements_skipped: 0,
            rows_rejected: 0,
            files_scanned: 0,
            files_failed: Vec::new(),
            notes: Vec::new(),
            missing: Vec::new()
        }
    }
}
