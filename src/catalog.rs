//! Tracked tables and their required fields.
//!
//! A [`Catalog`] is the ordered, read-only list of [`TableSpec`]s a coverage
//! run reports on. It is built once from configuration (or the built-in
//! default) and shared by reference with every stage afterwards.

use std::{fmt, sync::LazyLock};

use compact_str::CompactString;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppResult, catalog_error};

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Declaration of one tracked table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Human-readable name shown in reports
    pub label:           String,
    /// Unqualified table name as it appears in `INSERT INTO`
    pub table:           CompactString,
    /// Fields that must be present for a row to count as complete
    #[serde(rename = "required")]
    pub required_fields: Vec<CompactString>,
    /// Parent table whose row total drives SELECT-based bulk inserts here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_follow:     Option<CompactString>
}

impl TableSpec {
    pub fn new(label: impl Into<String>, table: &str, required: &[&str]) -> Self {
        Self {
            label:           label.into(),
            table:           table.into(),
            required_fields: required.iter().map(|f| CompactString::from(*f)).collect(),
            rows_follow:     None
        }
    }

    /// Mark this table's bulk SELECT inserts as tracking `parent` 1:1.
    #[must_use]
    pub fn following(mut self, parent: &str) -> Self {
        self.rows_follow = Some(parent.into());
        self
    }
}

/// Position of a [`TableSpec`] inside its [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TableId(pub usize);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered, validated set of tracked tables.
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: Vec<TableSpec>
}

impl Catalog {
    /// Build a catalog, rejecting malformed or inconsistent declarations.
    pub fn new(tables: Vec<TableSpec>) -> AppResult<Self> {
        if tables.is_empty() {
            return Err(catalog_error("catalog has no tables"));
        }
        for (i, spec) in tables.iter().enumerate() {
            if spec.label.trim().is_empty() {
                return Err(catalog_error(format!("table '{}' has an empty label", spec.table)));
            }
            if !IDENTIFIER_REGEX.is_match(&spec.table) {
                return Err(catalog_error(format!("invalid table name '{}'", spec.table)));
            }
            if spec.required_fields.is_empty() {
                return Err(catalog_error(format!(
                    "table '{}' declares no required fields",
                    spec.table
                )));
            }
            if let Some(field) = spec
                .required_fields
                .iter()
                .find(|f| !IDENTIFIER_REGEX.is_match(f))
            {
                return Err(catalog_error(format!(
                    "invalid field name '{}' in table '{}'",
                    field, spec.table
                )));
            }
            if tables[..i]
                .iter()
                .any(|other| other.table.eq_ignore_ascii_case(&spec.table))
            {
                return Err(catalog_error(format!("duplicate table '{}'", spec.table)));
            }
        }
        let catalog = Self {
            tables
        };
        for spec in &catalog.tables {
            if let Some(parent) = &spec.rows_follow {
                match catalog.lookup(parent) {
                    Some(id) if catalog.get(id).table != spec.table => {}
                    _ => {
                        return Err(catalog_error(format!(
                            "table '{}' follows unknown table '{}'",
                            spec.table, parent
                        )));
                    }
                }
            }
        }
        Ok(catalog)
    }

    /// Look up a table by name, ignoring ASCII case.
    pub fn lookup(&self, table: &str) -> Option<TableId> {
        self.tables
            .iter()
            .position(|spec| spec.table.eq_ignore_ascii_case(table))
            .map(TableId)
    }

    /// # Panics
    ///
    /// Panics if `id` did not come from this catalog.
    pub fn get(&self, id: TableId) -> &TableSpec {
        &self.tables[id.0]
    }

    /// Parent table for a child declared with `rows_follow`.
    pub fn parent_of(&self, id: TableId) -> Option<TableId> {
        self.get(id)
            .rows_follow
            .as_deref()
            .and_then(|parent| self.lookup(parent))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TableId, &TableSpec)> {
        self.tables
            .iter()
            .enumerate()
            .map(|(i, spec)| (TableId(i), spec))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Default for Catalog {
    /// Built-in catalog for the game-content seed corpus.
    fn default() -> Self {
        Self {
            tables: default_tables()
        }
    }
}

/// Tables tracked when configuration declares none.
pub fn default_tables() -> Vec<TableSpec> {
    vec![
        TableSpec::new("Items", "items", &["name", "description", "rarity", "icon"]),
        TableSpec::new("Item translations", "item_translations", &[
            "item_id",
            "locale",
            "name",
            "description",
        ])
        .following("items"),
        TableSpec::new("Creatures", "creatures", &[
            "name",
            "description",
            "level",
            "habitat",
        ]),
        TableSpec::new("Creature translations", "creature_translations", &[
            "creature_id",
            "locale",
            "name",
        ])
        .following("creatures"),
        TableSpec::new("Quests", "quests", &["title", "summary", "giver", "reward"]),
        TableSpec::new("Locations", "locations", &["name", "region", "description"]),
    ]
}
