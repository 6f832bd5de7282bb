//! `INSERT` statement parsing.
//!
//! Turns one statement span (see [`crate::statement`]) into a
//! [`ParsedInsert`]: target table, column list and rows. Rows come either
//! from a literal `VALUES` list or from the projections of a
//! `SELECT ... [UNION ALL SELECT ...]` body. No SQL grammar is involved;
//! everything is built on the top-level primitives in [`crate::scanner`].
//!
//! # Example
//!
//! ```
//! use content_coverage::{
//!     catalog::{Catalog, TableSpec},
//!     insert::{InsertMode, parse_insert_statement}
//! };
//!
//! let catalog = Catalog::new(vec![TableSpec::new("T", "t", &["a", "b"])]).unwrap();
//! let parsed = parse_insert_statement("INSERT INTO t (a,b) VALUES (1,2);", &catalog, None).unwrap();
//!
//! assert_eq!(parsed.mode(), InsertMode::Values);
//! assert_eq!(parsed.rows()[0].as_slice(), ["1", "2"]);
//! ```

mod types;

use compact_str::CompactString;
pub use types::{ColumnVec, InsertMode, ParsedInsert, Row, RowSource, SkipReason};

use crate::{
    catalog::{Catalog, TableId},
    coverage::is_artifact_row,
    scanner::{
        ScanState, find_keyword_outside, find_keyword_span, find_matching_paren, split_top_level,
        split_union_all
    }
};

/// Keywords that end a projection when a SELECT clause has no `FROM`.
const PROJECTION_TERMINATORS: [&str; 3] = ["where", "on conflict", "returning"];

/// Parse one `INSERT INTO ... ;` span.
///
/// `table_hint` narrows the accepted table further: a statement for any other
/// table is reported as [`SkipReason::UnknownTable`].
pub fn parse_insert_statement(
    span: &str,
    catalog: &Catalog,
    table_hint: Option<&str>
) -> Result<ParsedInsert, SkipReason> {
    let (_, after_keyword) =
        find_keyword_span(span, "insert into", 0).ok_or(SkipReason::MissingTableName)?;
    let (name, after_table) =
        read_table_reference(span, after_keyword).ok_or(SkipReason::MissingTableName)?;
    let table = catalog
        .lookup(&name)
        .filter(|id| {
            table_hint.is_none_or(|hint| catalog.get(*id).table.eq_ignore_ascii_case(hint))
        })
        .ok_or_else(|| SkipReason::UnknownTable(name.clone()))?;

    let open = after_table + leading_whitespace(&span[after_table..]);
    if span.as_bytes().get(open) != Some(&b'(') {
        return Err(SkipReason::MissingColumnList);
    }
    let close = find_matching_paren(span, open).ok_or(SkipReason::UnmatchedParen)?;
    let columns = parse_columns(&span[open + 1..close])?;

    let rest = &span[close + 1..];
    let values = find_keyword_span(rest, "values", 0);
    let select = find_keyword_outside(rest, "select", 0);
    let source = match (values, select) {
        (Some((at, end)), select) if select.is_none_or(|s| at < s) => RowSource::Values {
            rows: parse_values_rows(&rest[end..])
        },
        (_, Some(at)) => {
            let select_text = rest[at..].trim().trim_end_matches(';').trim_end();
            RowSource::Select {
                rows:        parse_select_rows(select_text),
                select_text: select_text.to_string()
            }
        }
        _ => return Err(SkipReason::NoRowSource)
    };
    keep_aligned_rows(table, columns, source)
}

/// Read `name`, `schema.name` or `"schema"."name"`; returns the last part and
/// the offset just past the reference.
fn read_table_reference(span: &str, from: usize) -> Option<(CompactString, usize)> {
    let bytes = span.as_bytes();
    let mut i = from + leading_whitespace(&span[from..]);
    loop {
        let part = match bytes.get(i) {
            Some(&quote @ (b'"' | b'`')) => {
                let close = i + 1 + span[i + 1..].find(quote as char)?;
                let part = &span[i + 1..close];
                i = close + 1;
                part
            }
            _ => {
                let len = bytes[i..].iter().take_while(|b| is_name_byte(**b)).count();
                if len == 0 {
                    return None;
                }
                let part = &span[i..i + len];
                i += len;
                part
            }
        };
        if bytes.get(i) == Some(&b'.') {
            i += 1;
            continue;
        }
        let part = part.trim();
        return (!part.is_empty()).then(|| (CompactString::from(part), i));
    }
}

fn parse_columns(list: &str) -> Result<ColumnVec, SkipReason> {
    let columns: ColumnVec = split_top_level(list, ',')
        .iter()
        .map(|c| CompactString::from(c.trim_matches(|ch| ch == '"' || ch == '`').trim()))
        .collect();
    if columns.is_empty() {
        return Err(SkipReason::EmptyColumnList);
    }
    if columns.iter().any(|c| c.is_empty()) {
        return Err(SkipReason::MalformedColumnList);
    }
    Ok(columns)
}

/// Collect each top-level `(...)` group after `VALUES` as one row.
///
/// Only quote state and paren depth matter here; brackets are array literal
/// syntax inside a row. Scanning stops at the first top-level `;`.
fn parse_values_rows(text: &str) -> Vec<Row> {
    let bytes = text.as_bytes();
    let mut rows = Vec::new();
    let mut state = ScanState::new();
    let mut row_start = None;
    let mut i = 0;
    while i < bytes.len() {
        if state.is_outside_parens() {
            match bytes[i] {
                b';' => break,
                b'(' => row_start = Some(i + 1),
                _ => {}
            }
        }
        let consumed = state.advance(bytes, i);
        if bytes[i] == b')'
            && state.is_outside_parens()
            && let Some(start) = row_start.take()
        {
            rows.push(split_top_level(&text[start..i], ',').into_iter().collect());
        }
        i += consumed;
    }
    rows
}

/// One synthetic row per `UNION ALL` clause: the expressions between the
/// clause's `SELECT` and its first top-level `FROM`.
fn parse_select_rows(select_text: &str) -> Vec<Row> {
    split_union_all(select_text)
        .iter()
        .filter_map(|clause| projection_row(clause))
        .collect()
}

fn projection_row(clause: &str) -> Option<Row> {
    let (_, after_select) = find_keyword_span(clause, "select", 0)?;
    let end = find_keyword_outside(clause, "from", after_select)
        .or_else(|| {
            PROJECTION_TERMINATORS
                .iter()
                .filter_map(|kw| find_keyword_outside(clause, kw, after_select))
                .min()
        })
        .unwrap_or(clause.len());
    let projection = clause[after_select..end].trim().trim_end_matches(';');
    let row: Row = split_top_level(projection, ',').into_iter().collect();
    (!row.is_empty()).then_some(row)
}

fn keep_aligned_rows(
    table: TableId,
    columns: ColumnVec,
    source: RowSource
) -> Result<ParsedInsert, SkipReason> {
    let width = columns.len();
    let mut rows_rejected = 0;
    let mut aligned = |rows: Vec<Row>| -> Vec<Row> {
        rows_rejected = rows
            .iter()
            .filter(|r| r.len() != width && !is_artifact_row(r))
            .count();
        rows.into_iter().filter(|r| r.len() == width).collect()
    };
    let source = match source {
        RowSource::Values {
            rows
        } => RowSource::Values {
            rows: aligned(rows)
        },
        RowSource::Select {
            rows,
            select_text
        } => RowSource::Select {
            rows: aligned(rows),
            select_text
        }
    };
    let parsed = ParsedInsert {
        table,
        columns,
        source,
        rows_rejected
    };
    if parsed.rows().is_empty() {
        return Err(SkipReason::NoRows);
    }
    Ok(parsed)
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}
