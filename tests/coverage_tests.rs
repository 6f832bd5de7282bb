use std::{fs, path::PathBuf};

use content_coverage::{
    catalog::{Catalog, TableSpec},
    corpus::{aggregate, discover_files, sample_statements, scan_files, scan_sql},
    coverage::{CoverageAggregator, DataSource, is_artifact_row, percent}
};
use smallvec::smallvec;
use tempfile::TempDir;

fn catalog() -> Catalog {
    Catalog::new(vec![
        TableSpec::new("Items", "items", &["name", "rarity"]),
        TableSpec::new("Item translations", "item_translations", &["item_id", "name"])
            .following("items"),
        TableSpec::new("Quests", "quests", &["title"]),
    ])
    .unwrap()
}

fn fold_all(catalog: &Catalog, sql: &str) -> content_coverage::coverage::CoverageReport {
    let mut aggregator = CoverageAggregator::new(catalog).with_missing(true);
    for (i, outcome) in scan_sql(sql, catalog, None).iter().enumerate() {
        match outcome {
            Ok(parsed) => aggregator.fold(parsed, "inline.sql", i + 1),
            Err(reason) => aggregator.skip(reason)
        }
    }
    aggregator.finish()
}

const SEED: &str = "\
-- items
INSERT INTO items (name, rarity) VALUES
    ('Sword', 'rare'),
    ('Shield', ''),        -- blank rarity
    ('Bow', 'common'),
    ('it''s a trap', 'epic');

/* translations follow items one to one */
INSERT INTO item_translations (item_id, name)
SELECT i.id, i.name FROM items i;

INSERT INTO quests (title) VALUES ('Rescue') ON CONFLICT (name) DO NOTHING;
INSERT INTO audit_log (event) VALUES ('seeded');
";

#[test]
fn test_pipeline_counts() {
    let catalog = catalog();
    let report = fold_all(&catalog, SEED);
    assert_eq!(report.source, DataSource::Files);
    assert_eq!((report.rows[0].total, report.rows[0].complete), (4, 3));
    assert_eq!(report.rows[0].percent(), 75);
    assert_eq!((report.rows[1].total, report.rows[1].complete), (4, 4));
    assert_eq!((report.rows[2].total, report.rows[2].complete), (1, 1));
    assert_eq!(report.statements_parsed, 3);
    assert_eq!(report.statements_skipped, 1);
    assert_eq!((report.total, report.complete), (9, 8));
    assert_eq!(report.percent, 89);
}

#[test]
fn test_missing_detail_for_blank_rarity() {
    let catalog = catalog();
    let report = fold_all(&catalog, SEED);
    assert_eq!(report.missing.len(), 1);
    let missing = &report.missing[0];
    assert_eq!(missing.table, "items");
    assert_eq!(missing.statement, 1);
    assert_eq!(missing.row, 2);
    assert_eq!(missing.missing, vec!["rarity"]);
}

#[test]
fn test_bulk_child_incomplete_counts_parent_total() {
    let catalog = catalog();
    let sql = "INSERT INTO items (name, rarity) VALUES ('a', 'x'), ('b', 'y');\n\
               INSERT INTO item_translations (item_id, name) SELECT i.id, NULL FROM items i;";
    let report = fold_all(&catalog, sql);
    assert_eq!((report.rows[1].total, report.rows[1].complete), (2, 0));
    assert_eq!(report.missing[0].multiplicity, 2);
}

#[test]
fn test_literal_select_into_child_counts_own_rows() {
    let catalog = catalog();
    let sql = "INSERT INTO items (name, rarity) VALUES \
               ('a', 'x'), ('b', 'x'), ('c', 'x'), ('d', 'x'), ('e', 'x');\n\
               INSERT INTO item_translations (item_id, name) \
               SELECT 1, 'x' UNION ALL SELECT 2, NULL;";
    let report = fold_all(&catalog, sql);
    assert_eq!((report.rows[0].total, report.rows[0].complete), (5, 5));
    assert_eq!((report.rows[1].total, report.rows[1].complete), (2, 1));
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].row, 2);
    assert_eq!(report.missing[0].multiplicity, 1);
}

#[test]
fn test_empty_table_percent_zero() {
    let catalog = catalog();
    let report = fold_all(&catalog, "");
    assert!(report.rows.iter().all(|r| r.total == 0 && r.percent() == 0));
    assert_eq!(report.percent, 0);
}

#[test]
fn test_complete_never_exceeds_total() {
    let catalog = catalog();
    let report = fold_all(&catalog, SEED);
    for row in &report.rows {
        assert!(row.complete <= row.total);
    }
}

#[test]
fn test_artifact_row_detection() {
    assert!(is_artifact_row(&smallvec![" Name ".to_string()]));
    assert!(!is_artifact_row(&smallvec!["'name'".to_string()]));
    assert!(!is_artifact_row(&smallvec!["name".to_string(), "x".to_string()]));
}

#[test]
fn test_percent_arithmetic() {
    assert_eq!(percent(3, 4), 75);
    assert_eq!(percent(0, 0), 0);
    assert_eq!(percent(1, 3), 33);
    assert_eq!(percent(1, 200), 1);
}

fn write_corpus() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(
        dir.path().join("01_items.sql"),
        "INSERT INTO items (name, rarity) VALUES ('a', 'x'), ('b', NULL);"
    )
    .unwrap();
    fs::write(
        dir.path().join("nested/02_translations.SQL"),
        "INSERT INTO item_translations (item_id, name) SELECT id, name FROM items;"
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "INSERT INTO quests (title) VALUES ('x');").unwrap();
    dir
}

#[test]
fn test_discover_files_sorted_and_filtered() {
    let dir = write_corpus();
    let files = discover_files(&[dir.path().to_path_buf()], &["sql".to_string()]).unwrap();
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("01_items.sql"));
    assert!(files[1].ends_with("nested/02_translations.SQL"));
}

#[test]
fn test_discover_missing_path_fails() {
    let result = discover_files(&[PathBuf::from("/definitely/not/here")], &["sql".to_string()]);
    assert!(result.is_err());
}

#[test]
fn test_scan_and_aggregate_directory() {
    let dir = write_corpus();
    let catalog = catalog();
    let files = discover_files(&[dir.path().to_path_buf()], &["sql".to_string()]).unwrap();
    let scans = scan_files(&files, &catalog, None);
    let report = aggregate(&catalog, &scans, false);
    assert_eq!(report.files_scanned, 2);
    assert!(report.files_failed.is_empty());
    assert_eq!((report.rows[0].total, report.rows[0].complete), (2, 1));
    assert_eq!((report.rows[1].total, report.rows[1].complete), (2, 2));
    assert!(report.missing.is_empty());
}

#[test]
fn test_unreadable_file_is_listed() {
    let dir = TempDir::new().unwrap();
    let catalog = catalog();
    let ghost = dir.path().join("ghost.sql");
    let scans = scan_files(&[ghost.clone()], &catalog, None);
    let report = aggregate(&catalog, &scans, false);
    assert_eq!(report.files_scanned, 0);
    assert_eq!(report.files_failed, vec![ghost.display().to_string()]);
}

#[test]
fn test_sample_statements_limit() {
    let dir = write_corpus();
    let catalog = catalog();
    let files = discover_files(&[dir.path().to_path_buf()], &["sql".to_string()]).unwrap();
    let samples = sample_statements(&files, &catalog, "items", 5);
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].1.rows().len(), 2);
    assert!(sample_statements(&files, &catalog, "items", 0).is_empty());
}
