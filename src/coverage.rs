//! Folding parsed statements into per-table coverage.
//!
//! A [`CoverageAggregator`] owns one [`CoverageRow`] per catalog table, in
//! catalog order, and is fed [`ParsedInsert`]s one at a time. Statements
//! must be folded in a deterministic order: bulk SELECT inserts into a child
//! table read the parent's running total at the moment they are folded.
//! Only a SELECT that reads `FROM` a relation is a bulk insert; a body of
//! literal `SELECT ... UNION ALL SELECT ...` clauses counts one row per
//! clause.
//!
//! # Completeness
//!
//! Required fields are matched to the statement's columns ignoring ASCII
//! case. A field is missing when its column is absent or its value fails
//! [`is_present`]. A row is complete when no field is missing.
//!
//! # Example
//!
//! ```
//! use content_coverage::{
//!     catalog::{Catalog, TableSpec},
//!     coverage::CoverageAggregator,
//!     insert::parse_insert_statement
//! };
//!
//! let catalog = Catalog::new(vec![TableSpec::new("T", "t", &["a"])]).unwrap();
//! let mut aggregator = CoverageAggregator::new(&catalog);
//! let sql = "INSERT INTO t (a) VALUES ('x'), (NULL), ('y'), ('z');";
//! let parsed = parse_insert_statement(sql, &catalog, None).unwrap();
//! aggregator.fold(&parsed, "seed.sql", 1);
//!
//! let report = aggregator.finish();
//! assert_eq!(report.rows[0].percent(), 75);
//! ```

mod types;

use compact_str::CompactString;
use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;
pub use types::{CoverageReport, CoverageRow, DataSource, MissingFields, percent};

use crate::{
    catalog::{Catalog, TableId, TableSpec},
    insert::{ParsedInsert, Row, RowSource, SkipReason},
    scanner::{find_keyword_outside, split_union_all},
    value::is_present
};

/// Per-table accumulator for one coverage run.
pub struct CoverageAggregator<'a> {
    catalog:            &'a Catalog,
    rows:               IndexMap<TableId, CoverageRow>,
    track_missing:      bool,
    missing:            Vec<MissingFields>,
    statements_parsed:  usize,
    statements_skipped: usize,
    rows_rejected:      usize
}

impl<'a> CoverageAggregator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            rows: catalog
                .iter()
                .map(|(id, spec)| (id, CoverageRow::empty(spec)))
                .collect(),
            track_missing: false,
            missing: Vec::new(),
            statements_parsed: 0,
            statements_skipped: 0,
            rows_rejected: 0
        }
    }

    /// Also record which required fields each incomplete row lacks.
    #[must_use]
    pub fn with_missing(mut self, track: bool) -> Self {
        self.track_missing = track;
        self
    }

    /// Fold one parsed statement. `origin` and `statement` only label the
    /// missing-field detail.
    pub fn fold(&mut self, insert: &ParsedInsert, origin: &str, statement: usize) {
        self.statements_parsed += 1;
        self.rows_rejected += insert.rows_rejected;
        let catalog = self.catalog;
        let spec = catalog.get(insert.table);
        let positions = required_positions(spec, insert);
        let verdicts: Vec<(usize, SmallVec<[CompactString; 4]>)> = insert
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| !is_artifact_row(row))
            .map(|(i, row)| (i + 1, missing_fields(spec, &positions, row)))
            .collect();
        if verdicts.is_empty() {
            return;
        }

        let parent = catalog.parent_of(insert.table);
        let bulk_parent = match (&insert.source, parent) {
            (
                RowSource::Select {
                    select_text, ..
                },
                Some(parent)
            ) if reads_from_relation(select_text) => Some(parent),
            _ => None
        };

        match bulk_parent {
            Some(parent) => {
                let multiplicity = self.rows.get(&parent).map_or(0, |r| r.total);
                debug!(
                    table = %spec.table,
                    parent = %catalog.get(parent).table,
                    multiplicity,
                    "bulk SELECT insert follows parent row count"
                );
                let complete = verdicts.iter().all(|(_, missing)| missing.is_empty());
                self.row_mut(insert.table).add(multiplicity, complete);
                for (row, missing) in verdicts {
                    self.record_missing(spec, origin, statement, row, multiplicity, missing);
                }
            }
            None => {
                for (row, missing) in verdicts {
                    self.row_mut(insert.table).add(1, missing.is_empty());
                    self.record_missing(spec, origin, statement, row, 1, missing);
                }
            }
        }
    }

    /// Count a statement that could not be parsed.
    pub fn skip(&mut self, reason: &SkipReason) {
        debug!(%reason, "statement skipped");
        self.statements_skipped += 1;
    }

    /// Current counters for `id`.
    pub fn row(&self, id: TableId) -> &CoverageRow {
        &self.rows[&id]
    }

    pub fn statements_parsed(&self) -> usize {
        self.statements_parsed
    }

    pub fn statements_skipped(&self) -> usize {
        self.statements_skipped
    }

    /// Finalize into a file-sourced report in catalog order.
    pub fn finish(self) -> CoverageReport {
        let mut report =
            CoverageReport::new(DataSource::Files, self.rows.into_values().collect());
        report.statements_parsed = self.statements_parsed;
        report.statements_skipped = self.statements_skipped;
        report.rows_rejected = self.rows_rejected;
        report.missing = self.missing;
        report
    }

    fn row_mut(&mut self, id: TableId) -> &mut CoverageRow {
        &mut self.rows[&id]
    }

    fn record_missing(
        &mut self,
        spec: &TableSpec,
        origin: &str,
        statement: usize,
        row: usize,
        multiplicity: u64,
        missing: SmallVec<[CompactString; 4]>
    ) {
        if !self.track_missing || missing.is_empty() || multiplicity == 0 {
            return;
        }
        self.missing.push(MissingFields {
            table: spec.table.clone(),
            origin: origin.to_string(),
            statement,
            row,
            multiplicity,
            missing: missing.into_vec()
        });
    }
}

/// A lone `name` value captured from an `ON CONFLICT (name)` target.
pub fn is_artifact_row(row: &Row) -> bool {
    row.len() == 1 && row[0].trim().eq_ignore_ascii_case("name")
}

/// Whether any `UNION ALL` clause selects from a relation. A body made only
/// of literal projections carries its own row count.
fn reads_from_relation(select_text: &str) -> bool {
    split_union_all(select_text)
        .iter()
        .any(|clause| find_keyword_outside(clause, "from", 0).is_some())
}

/// Column index of each required field, in required-field order.
fn required_positions(spec: &TableSpec, insert: &ParsedInsert) -> SmallVec<[Option<usize>; 8]> {
    spec.required_fields
        .iter()
        .map(|field| {
            insert
                .columns
                .iter()
                .position(|column| column.eq_ignore_ascii_case(field))
        })
        .collect()
}

fn missing_fields(
    spec: &TableSpec,
    positions: &[Option<usize>],
    row: &Row
) -> SmallVec<[CompactString; 4]> {
    spec.required_fields
        .iter()
        .zip(positions)
        .filter(|(_, position)| {
            position
                .and_then(|i| row.get(i))
                .is_none_or(|value| !is_present(value))
        })
        .map(|(field, _)| field.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::TableSpec, insert::parse_insert_statement};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            TableSpec::new("Items", "items", &["name", "rarity"]),
            TableSpec::new("Item translations", "item_translations", &["item_id", "name"])
                .following("items"),
        ])
        .unwrap()
    }

    fn fold_sql(aggregator: &mut CoverageAggregator<'_>, catalog: &Catalog, sql: &str) {
        match parse_insert_statement(sql, catalog, None) {
            Ok(parsed) => aggregator.fold(&parsed, "test.sql", 1),
            Err(reason) => aggregator.skip(&reason)
        }
    }

    #[test]
    fn test_missing_column_counts_as_missing() {
        let catalog = catalog();
        let mut aggregator = CoverageAggregator::new(&catalog);
        fold_sql(&mut aggregator, &catalog, "INSERT INTO items (name) VALUES ('Sword');");
        let row = aggregator.row(TableId(0));
        assert_eq!((row.total, row.complete), (1, 0));
    }

    #[test]
    fn test_case_insensitive_alignment() {
        let catalog = catalog();
        let mut aggregator = CoverageAggregator::new(&catalog);
        fold_sql(
            &mut aggregator,
            &catalog,
            "INSERT INTO items (\"NAME\", Rarity) VALUES ('Sword', 'rare'), ('', 'common');"
        );
        let row = aggregator.row(TableId(0));
        assert_eq!((row.total, row.complete), (2, 1));
    }

    #[test]
    fn test_bulk_select_uses_parent_total() {
        let catalog = catalog();
        let mut aggregator = CoverageAggregator::new(&catalog);
        fold_sql(
            &mut aggregator,
            &catalog,
            "INSERT INTO items (name, rarity) VALUES ('a', 'x'), ('b', 'y'), ('c', 'z');"
        );
        fold_sql(
            &mut aggregator,
            &catalog,
            "INSERT INTO item_translations (item_id, name) SELECT i.id, i.name FROM items i;"
        );
        let row = aggregator.row(TableId(1));
        assert_eq!((row.total, row.complete), (3, 3));
    }

    #[test]
    fn test_bulk_select_before_parent_counts_nothing() {
        let catalog = catalog();
        let mut aggregator = CoverageAggregator::new(&catalog);
        fold_sql(
            &mut aggregator,
            &catalog,
            "INSERT INTO item_translations (item_id, name) SELECT i.id, i.name FROM items i;"
        );
        assert_eq!(aggregator.row(TableId(1)).total, 0);
        assert_eq!(aggregator.statements_parsed(), 1);
    }

    #[test]
    fn test_values_into_child_counts_rows() {
        let catalog = catalog();
        let mut aggregator = CoverageAggregator::new(&catalog);
        fold_sql(
            &mut aggregator,
            &catalog,
            "INSERT INTO item_translations (item_id, name) VALUES (1, 'a'), (2, NULL);"
        );
        let row = aggregator.row(TableId(1));
        assert_eq!((row.total, row.complete), (2, 1));
    }

    #[test]
    fn test_reads_from_relation() {
        assert!(reads_from_relation("SELECT i.id, i.name FROM items i"));
        assert!(reads_from_relation("SELECT 1, 'a' UNION ALL SELECT id, name FROM items"));
        assert!(!reads_from_relation("SELECT 1, 'x' UNION ALL SELECT 2, NULL"));
        assert!(!reads_from_relation("SELECT 1, 'from here'"));
        assert!(!reads_from_relation("SELECT (SELECT max(id) FROM items), 'x'"));
    }

    #[test]
    fn test_artifact_row_never_counted() {
        let catalog = Catalog::new(vec![TableSpec::new("Tags", "tags", &["name"])]).unwrap();
        let mut aggregator = CoverageAggregator::new(&catalog);
        fold_sql(
            &mut aggregator,
            &catalog,
            "INSERT INTO tags (name) VALUES ('fire') ON CONFLICT (name) DO NOTHING;"
        );
        let row = aggregator.row(TableId(0));
        assert_eq!((row.total, row.complete), (1, 1));
    }

    #[test]
    fn test_skip_counts() {
        let catalog = catalog();
        let mut aggregator = CoverageAggregator::new(&catalog);
        fold_sql(&mut aggregator, &catalog, "INSERT INTO ghosts (a) VALUES (1);");
        fold_sql(&mut aggregator, &catalog, "INSERT INTO items VALUES (1);");
        assert_eq!(aggregator.statements_skipped(), 2);
        assert_eq!(aggregator.statements_parsed(), 0);
    }

    #[test]
    fn test_missing_detail_recorded() {
        let catalog = catalog();
        let mut aggregator = CoverageAggregator::new(&catalog).with_missing(true);
        fold_sql(
            &mut aggregator,
            &catalog,
            "INSERT INTO items (name, rarity) VALUES ('a', 'x'), (NULL, '');"
        );
        let report = aggregator.finish();
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.missing[0].row, 2);
        assert_eq!(report.missing[0].missing, vec!["name", "rarity"]);
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(3, 4), 75);
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
    }
}
