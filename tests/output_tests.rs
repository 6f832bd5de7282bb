use std::path::PathBuf;

use compact_str::CompactString;
use content_coverage::{
    catalog::{Catalog, TableSpec},
    coverage::{CoverageReport, CoverageRow, DataSource, MissingFields},
    insert::parse_insert_statement,
    output::{OutputFormat, OutputOptions, format_catalog, format_report, format_samples}
};

fn report() -> CoverageReport {
    let mut quests = CoverageRow::empty(&TableSpec::new("Quests", "quests", &["title", "giver"]));
    quests.add(2, true);
    quests.add(1, false);
    let locations = CoverageRow::empty(&TableSpec::new("Locations", "locations", &["name"]));
    let mut report = CoverageReport::new(DataSource::Files, vec![quests, locations]);
    report.notes = vec!["Statements parsed: 2, skipped: 1".to_string()];
    report.missing = vec![MissingFields {
        table:        CompactString::from("quests"),
        origin:       "seeds/quests.sql".to_string(),
        statement:    1,
        row:          3,
        multiplicity: 1,
        missing:      vec![CompactString::from("giver")]
    }];
    report
}

fn opts(format: OutputFormat, show_missing: bool) -> OutputOptions {
    OutputOptions {
        format,
        colored: false,
        show_missing
    }
}

#[test]
fn test_markdown_rows_and_totals() {
    let out = format_report(&report(), &opts(OutputFormat::Markdown, false));
    assert!(out.starts_with("# Content coverage"));
    assert!(out.contains("| Quests | `quests` | 3 | title, giver | 2 | 67% |"));
    assert!(out.contains("| Locations | `locations` | 0 | name | 0 | 0% |"));
    assert!(out.contains("| **Total** | | **3** | | **2** | **67%** |"));
    assert!(out.contains("## Notes"));
}

#[test]
fn test_markdown_missing_only_when_requested() {
    let without = format_report(&report(), &opts(OutputFormat::Markdown, false));
    assert!(!without.contains("seeds/quests.sql"));
    let with = format_report(&report(), &opts(OutputFormat::Markdown, true));
    assert!(with.contains("| `quests` | seeds/quests.sql | 1 | 3 | 1 | giver |"));
}

#[test]
fn test_markdown_no_incomplete_rows() {
    let mut report = report();
    report.missing.clear();
    let out = format_report(&report, &opts(OutputFormat::Markdown, true));
    assert!(out.contains("No incomplete rows."));
}

#[test]
fn test_text_plain() {
    let out = format_report(&report(), &opts(OutputFormat::Text, true));
    assert!(out.contains("Content coverage (SQL files)"));
    assert!(out.contains("Quests"));
    assert!(out.contains(" 67%"));
    assert!(out.contains("note: Statements parsed: 2, skipped: 1"));
    assert!(out.contains("Missing fields:"));
    assert!(!out.contains("\u{1b}["));
}

#[test]
fn test_json_roundtrips_counters() {
    let out = format_report(&report(), &opts(OutputFormat::Json, false));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["total"], 3);
    assert_eq!(value["complete"], 2);
    assert_eq!(value["percent"], 67);
    assert_eq!(value["rows"][0]["required_fields"][1], "giver");
    assert_eq!(value["missing"][0]["row"], 3);
}

#[test]
fn test_json_omits_empty_missing() {
    let mut report = report();
    report.missing.clear();
    let out = format_report(&report, &opts(OutputFormat::Json, false));
    assert!(!out.contains("\"missing\""));
}

#[test]
fn test_yaml_output() {
    let out = format_report(&report(), &opts(OutputFormat::Yaml, false));
    assert!(out.contains("source: files"));
    assert!(out.contains("table: quests"));
}

#[test]
fn test_catalog_text() {
    let catalog = Catalog::default();
    let out = format_catalog(&catalog, &opts(OutputFormat::Text, false));
    assert!(out.contains("item_translations (Item translations): item_id, locale, name"));
    assert!(out.contains("[follows items]"));
}

#[test]
fn test_catalog_json() {
    let catalog = Catalog::default();
    let out = format_catalog(&catalog, &opts(OutputFormat::Json, false));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value[0]["table"], "items");
    assert_eq!(value[1]["rows_follow"], "items");
    assert!(value[0].get("rows_follow").is_none());
}

#[test]
fn test_format_samples() {
    let catalog = Catalog::new(vec![TableSpec::new("Quests", "quests", &["title"])]).unwrap();
    let parsed = parse_insert_statement(
        "INSERT INTO quests (title)\n  SELECT 'a'\n  UNION ALL SELECT 'b';",
        &catalog,
        None
    )
    .unwrap();
    let samples = vec![(PathBuf::from("q.sql"), parsed)];
    let out = format_samples("quests", &samples, 1);
    assert!(out.starts_with("== quests: 1 sampled statement(s) =="));
    assert!(out.contains("q.sql: SELECT mode, columns (title), 2 row(s), 0 rejected"));
    assert!(out.contains("  select: SELECT 'a' UNION ALL SELECT 'b'"));
    assert!(out.contains("  [1] 'a'"));
    assert!(!out.contains("  [2]"));
}
