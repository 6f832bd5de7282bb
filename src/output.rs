//! Report rendering.
//!
//! A [`CoverageReport`] renders as a markdown document (the default), as
//! colored terminal text, or as JSON / YAML for tooling. Structured formats
//! serialize the report as-is; the missing-field list is only present when
//! it was collected.

use std::{fmt::Write as _, path::PathBuf};

use colored::Colorize;
use compact_str::CompactString;

use crate::{
    catalog::Catalog,
    coverage::{CoverageReport, CoverageRow},
    insert::ParsedInsert
};

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:       OutputFormat,
    pub colored:      bool,
    pub show_missing: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:       OutputFormat::Markdown,
            colored:      true,
            show_missing: false
        }
    }
}

/// Render a full coverage report.
pub fn format_report(report: &CoverageReport, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(report).unwrap_or_default(),
        OutputFormat::Markdown => format_markdown(report, opts.show_missing),
        OutputFormat::Text => format_text(report, opts)
    }
}

fn join_fields(fields: &[CompactString]) -> String {
    fields
        .iter()
        .map(CompactString::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn md_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn format_markdown(report: &CoverageReport, show_missing: bool) -> String {
    let mut out = String::from("# Content coverage\n\n");
    out.push_str("| Label | Table | Rows | Required fields | Complete | Coverage |\n");
    out.push_str("|-------|-------|-----:|-----------------|---------:|---------:|\n");
    for row in &report.rows {
        let _ = writeln!(
            out,
            "| {} | `{}` | {} | {} | {} | {}% |",
            md_cell(&row.label),
            row.table,
            row.total,
            md_cell(&join_fields(&row.required_fields)),
            row.complete,
            row.percent()
        );
    }
    let _ = writeln!(
        out,
        "| **Total** | | **{}** | | **{}** | **{}%** |",
        report.total, report.complete, report.percent
    );

    if !report.notes.is_empty() {
        out.push_str("\n## Notes\n\n");
        for note in &report.notes {
            let _ = writeln!(out, "- {}", note);
        }
    }

    if show_missing {
        out.push_str("\n## Missing fields\n\n");
        if report.missing.is_empty() {
            out.push_str("No incomplete rows.\n");
        } else {
            out.push_str("| Table | Origin | Statement | Row | Rows | Missing |\n");
            out.push_str("|-------|--------|----------:|----:|-----:|---------|\n");
            for m in &report.missing {
                let _ = writeln!(
                    out,
                    "| `{}` | {} | {} | {} | {} | {} |",
                    m.table,
                    md_cell(&m.origin),
                    m.statement,
                    m.row,
                    m.multiplicity,
                    md_cell(&join_fields(&m.missing))
                );
            }
        }
    }
    out
}

fn colored_percent(value: u32, colored: bool) -> String {
    let text = format!("{:>3}%", value);
    if !colored {
        return text;
    }
    match value {
        90.. => text.green().to_string(),
        50..=89 => text.yellow().to_string(),
        _ => text.red().to_string()
    }
}

fn text_row(row: &CoverageRow, colored: bool) -> String {
    format!(
        "{:<28} {:>8} {:>8}  {}  [{}]\n",
        row.label,
        row.complete,
        row.total,
        colored_percent(row.percent(), colored),
        join_fields(&row.required_fields)
    )
}

fn format_text(report: &CoverageReport, opts: &OutputOptions) -> String {
    let mut out = String::new();
    let header = format!("Content coverage ({})", report.source);
    if opts.colored {
        out.push_str(&header.bold().to_string());
    } else {
        out.push_str(&header);
    }
    out.push_str("\n\n");
    let _ = writeln!(
        out,
        "{:<28} {:>8} {:>8}  {:>4}",
        "Table", "Complete", "Rows", "Pct"
    );
    for row in &report.rows {
        out.push_str(&text_row(row, opts.colored));
    }
    let _ = writeln!(
        out,
        "{:<28} {:>8} {:>8}  {}",
        "Total",
        report.complete,
        report.total,
        colored_percent(report.percent, opts.colored)
    );

    if !report.notes.is_empty() {
        out.push('\n');
        for note in &report.notes {
            let line = format!("note: {}", note);
            if opts.colored {
                out.push_str(&line.dimmed().to_string());
            } else {
                out.push_str(&line);
            }
            out.push('\n');
        }
    }

    if opts.show_missing && !report.missing.is_empty() {
        out.push('\n');
        let title = "Missing fields:";
        if opts.colored {
            out.push_str(&title.yellow().bold().to_string());
        } else {
            out.push_str(title);
        }
        out.push('\n');
        for m in &report.missing {
            let _ = writeln!(
                out,
                "  {} {}#{} row {} (x{}): {}",
                m.table,
                m.origin,
                m.statement,
                m.row,
                m.multiplicity,
                join_fields(&m.missing)
            );
        }
    }
    out
}

/// Render the catalog for the `tables` command.
pub fn format_catalog(catalog: &Catalog, opts: &OutputOptions) -> String {
    let specs: Vec<_> = catalog.iter().map(|(_, spec)| spec).collect();
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(&specs).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(&specs).unwrap_or_default(),
        OutputFormat::Markdown => {
            let mut out = String::from("| Label | Table | Required fields | Follows |\n");
            out.push_str("|-------|-------|-----------------|---------|\n");
            for spec in specs {
                let _ = writeln!(
                    out,
                    "| {} | `{}` | {} | {} |",
                    md_cell(&spec.label),
                    spec.table,
                    md_cell(&join_fields(&spec.required_fields)),
                    spec.rows_follow.as_deref().unwrap_or("")
                );
            }
            out
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for spec in specs {
                let name = if opts.colored {
                    spec.table.cyan().bold().to_string()
                } else {
                    spec.table.to_string()
                };
                let _ = write!(
                    out,
                    "{} ({}): {}",
                    name,
                    spec.label,
                    join_fields(&spec.required_fields)
                );
                if let Some(parent) = &spec.rows_follow {
                    let _ = write!(out, " [follows {}]", parent);
                }
                out.push('\n');
            }
            out
        }
    }
}

/// Render sampled statements for `--debug-table`.
pub fn format_samples(table: &str, samples: &[(PathBuf, ParsedInsert)], limit: usize) -> String {
    let mut out = format!("== {}: {} sampled statement(s) ==\n", table, samples.len());
    for (path, parsed) in samples {
        let _ = writeln!(
            out,
            "{}: {} mode, columns ({}), {} row(s), {} rejected",
            path.display(),
            parsed.mode(),
            join_fields(&parsed.columns),
            parsed.rows().len(),
            parsed.rows_rejected
        );
        if let Some(select) = parsed.select_text() {
            let _ = writeln!(out, "  select: {}", collapse_whitespace(select));
        }
        for (i, row) in parsed.rows().iter().take(limit).enumerate() {
            let _ = writeln!(out, "  [{}] {}", i + 1, row.join(" | "));
        }
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
