use std::fmt;

use compact_str::CompactString;
use serde::Serialize;
use smallvec::SmallVec;

use crate::catalog::TableId;

/// Column names of one statement (typically < 8 elements)
pub type ColumnVec = SmallVec<[CompactString; 8]>;

/// Raw value tokens of one row, positionally aligned with the columns
pub type Row = SmallVec<[String; 8]>;

/// Structured result of parsing one `INSERT` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedInsert {
    pub table:         TableId,
    pub columns:       ColumnVec,
    pub source:        RowSource,
    /// Rows dropped because their arity did not match `columns`
    pub rows_rejected: usize
}

/// Where a statement's rows came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RowSource {
    /// `VALUES (...), (...)`
    Values { rows: Vec<Row> },
    /// `SELECT ... [UNION ALL SELECT ...]`, one synthetic row per clause
    Select {
        rows:        Vec<Row>,
        select_text: String
    }
}

/// How an `INSERT` supplies its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InsertMode {
    Values,
    Select
}

impl ParsedInsert {
    pub fn rows(&self) -> &[Row] {
        match &self.source {
            RowSource::Values {
                rows
            }
            | RowSource::Select {
                rows, ..
            } => rows
        }
    }

    pub fn mode(&self) -> InsertMode {
        match self.source {
            RowSource::Values {
                ..
            } => InsertMode::Values,
            RowSource::Select {
                ..
            } => InsertMode::Select
        }
    }

    /// Raw SELECT clause, for Select-mode statements only.
    pub fn select_text(&self) -> Option<&str> {
        match &self.source {
            RowSource::Select {
                select_text, ..
            } => Some(select_text),
            RowSource::Values {
                ..
            } => None
        }
    }
}

impl fmt::Display for InsertMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Values => write!(f, "VALUES"),
            Self::Select => write!(f, "SELECT")
        }
    }
}

/// Why a statement was not turned into a [`ParsedInsert`].
///
/// Every reason is recoverable: the statement is counted as skipped and the
/// run continues.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkipReason {
    MissingTableName,
    /// Table is not tracked (or differs from the requested table)
    UnknownTable(CompactString),
    MissingColumnList,
    UnmatchedParen,
    EmptyColumnList,
    MalformedColumnList,
    /// Neither `VALUES` nor `SELECT` follows the column list
    NoRowSource,
    /// No row survived parsing and the arity check
    NoRows
}

impl SkipReason {
    /// Statement targets a table outside the catalog.
    pub fn is_out_of_scope(&self) -> bool {
        matches!(self, Self::UnknownTable(_))
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTableName => write!(f, "no table name after INSERT INTO"),
            Self::UnknownTable(name) => write!(f, "table '{}' is not tracked", name),
            Self::MissingColumnList => write!(f, "no column list after table name"),
            Self::UnmatchedParen => write!(f, "unmatched parenthesis in column list"),
            Self::EmptyColumnList => write!(f, "empty column list"),
            Self::MalformedColumnList => write!(f, "blank column name in column list"),
            Self::NoRowSource => write!(f, "no VALUES or SELECT clause"),
            Self::NoRows => write!(f, "no row matches the column count")
        }
    }
}
