//! Core data models for the metadata handed to the document pipeline.
//!
//! Rows arrive already decoded from the metadata catalogs (see
//! [`crate::adapters`]) or from a snapshot file written by the collector.
//! Everything here is plain data and serializable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot format version written by the collector and accepted by the renderer.
pub const FORMAT_VERSION: &str = "1.0";

/// One column of one base table, with its key metadata.
///
/// Rows are ordered by table name and then by the column's ordinal position.
/// Empty strings from the driver are normalised to `None` at the decoding
/// boundary, so an `Option` here is the only "no value" representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    /// Owning table
    pub table: String,
    /// Column name
    pub column: String,
    /// Part of the table's primary key
    pub is_primary: bool,
    /// Table referenced by a foreign key on this column
    #[serde(default)]
    pub ref_table: Option<String>,
    /// Column referenced by that foreign key
    #[serde(default)]
    pub ref_column: Option<String>,
    /// Covered by a `UNIQUE` constraint
    #[serde(default)]
    pub is_unique: bool,
    /// The referenced column is covered by a `UNIQUE` constraint
    #[serde(default)]
    pub ref_is_unique: bool,
    /// Name of the foreign key constraint
    #[serde(default)]
    pub constraint_name: Option<String>,
}

impl ColumnRow {
    /// Creates a plain column row with no keys.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            is_primary: false,
            ref_table: None,
            ref_column: None,
            is_unique: false,
            ref_is_unique: false,
            constraint_name: None,
        }
    }

    /// Builder method to mark the column as (part of) the primary key.
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    /// Builder method to mark the column as covered by a unique constraint.
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Builder method to attach a foreign-key reference.
    pub fn references(
        mut self,
        constraint: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
        ref_is_unique: bool,
    ) -> Self {
        self.constraint_name = Some(constraint.into());
        self.ref_table = Some(ref_table.into());
        self.ref_column = Some(ref_column.into());
        self.ref_is_unique = ref_is_unique;
        self
    }

    /// Whether this side of a relationship is unique (primary or unique key).
    pub fn is_source_unique(&self) -> bool {
        self.is_primary || self.is_unique
    }

    /// Returns the `(ref_table, ref_column)` pair when both are present.
    pub fn foreign_key_target(&self) -> Option<(&str, &str)> {
        match (non_empty(&self.ref_table), non_empty(&self.ref_column)) {
            (Some(table), Some(column)) => Some((table, column)),
            _ => None,
        }
    }

    /// Identifier used to deduplicate relationship annotations.
    ///
    /// Only rows that reference another table through a named constraint
    /// have one.
    pub fn foreign_key_id(&self) -> Option<ForeignKeyId> {
        non_empty(&self.ref_table)?;
        let constraint = non_empty(&self.constraint_name)?;
        Some(ForeignKeyId {
            table: self.table.clone(),
            column: self.column.clone(),
            constraint: constraint.to_string(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// A `(table, column, constraint)` triple identifying one foreign key usage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForeignKeyId {
    /// Referencing table
    pub table: String,
    /// Referencing column
    pub column: String,
    /// Constraint name
    pub constraint: String,
}

impl fmt::Display for ForeignKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.table, self.column, self.constraint)
    }
}

/// One row of the view/table usage catalog: `view` reads from `table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewTableUsage {
    /// View name
    pub view: String,
    /// Table the view reads from
    pub table: String,
}

impl ViewTableUsage {
    /// Creates a usage row.
    pub fn new(view: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            table: table.into(),
        }
    }
}

/// Everything the renderer needs for one database, as written by the collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Must equal [`FORMAT_VERSION`] to be accepted
    pub format_version: String,
    /// Name of the documented database
    pub database: String,
    /// Engine label of the source server, e.g. `MySQL` or `MariaDB`
    #[serde(default = "default_engine")]
    pub engine: String,
    /// When the catalogs were read
    pub collected_at: chrono::DateTime<chrono::Utc>,
    /// Version of the collector that wrote the snapshot
    pub collector_version: String,
    /// Column rows ordered by table, then ordinal position
    pub columns: Vec<ColumnRow>,
    /// Stored procedure names
    #[serde(default)]
    pub procedures: Vec<String>,
    /// View/table usage rows ordered by view
    #[serde(default)]
    pub views: Vec<ViewTableUsage>,
}

fn default_engine() -> String {
    crate::markdown::DEFAULT_ENGINE.to_string()
}

impl SchemaSnapshot {
    /// Creates an empty snapshot for the named database.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            database: database.into(),
            engine: default_engine(),
            collected_at: chrono::Utc::now(),
            collector_version: env!("CARGO_PKG_VERSION").to_string(),
            columns: Vec::new(),
            procedures: Vec::new(),
            views: Vec::new(),
        }
    }

    /// Builder method to set the engine label.
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    /// Parses a snapshot from JSON and checks its format version.
    ///
    /// # Errors
    /// Returns a serialization error for malformed JSON and a configuration
    /// error for an unsupported `format_version`.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let snapshot: Self = serde_json::from_str(json).map_err(|e| {
            crate::error::ScribeError::Serialization {
                context: "Failed to parse schema snapshot".to_string(),
                source: e,
            }
        })?;

        if snapshot.format_version != FORMAT_VERSION {
            return Err(crate::error::ScribeError::configuration(format!(
                "Unsupported snapshot format version '{}' (expected '{}')",
                snapshot.format_version, FORMAT_VERSION
            )));
        }

        Ok(snapshot)
    }

    /// Serializes the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns a serialization error if encoding fails.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::error::ScribeError::Serialization {
            context: "Failed to serialize schema snapshot".to_string(),
            source: e,
        })
    }

    /// Number of distinct tables, counting consecutive runs of rows.
    pub fn table_count(&self) -> usize {
        let mut count = 0usize;
        let mut current: Option<&str> = None;
        for row in &self.columns {
            if current != Some(row.table.as_str()) {
                count = count.saturating_add(1);
                current = Some(row.table.as_str());
            }
        }
        count
    }
}

#[cfg(test)]
mod tests;
