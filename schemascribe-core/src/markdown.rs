//! Markdown schema document rendering.
//!
//! The document is produced in fragments that the caller writes in order:
//! [`render_tables`] starts a fresh file, then [`render_procedures`],
//! [`crate::views::render_views`] and any external analysis are appended.
//! Tables and categories are wrapped in `<details>` blocks whose layout the
//! index scanner in [`crate::index`] relies on.

use crate::models::{ColumnRow, ForeignKeyId};
use crate::procedures::{CategorizedProcedures, describe_procedure};
use crate::relationship::{Cardinality, describe_row};
use std::collections::HashSet;
use std::fmt::Write;

/// Default engine label used in headings.
pub const DEFAULT_ENGINE: &str = "MySQL";

/// Per-document rendering state.
///
/// Holds the names used in headings and the set of foreign keys already
/// annotated. Create one per generated document.
#[derive(Debug, Clone)]
pub struct RenderContext {
    engine: String,
    database: String,
    seen_foreign_keys: HashSet<ForeignKeyId>,
}

impl RenderContext {
    /// Creates a context for `database` with the default engine label.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            engine: DEFAULT_ENGINE.to_string(),
            database: database.into(),
            seen_foreign_keys: HashSet::new(),
        }
    }

    /// Builder method to override the engine label in headings.
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    /// Engine label.
    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// Database name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Number of distinct foreign keys annotated so far.
    pub fn unique_foreign_keys(&self) -> usize {
        self.seen_foreign_keys.len()
    }

    /// Records a foreign key, returning `true` the first time it is seen.
    fn mark_foreign_key(&mut self, id: ForeignKeyId) -> bool {
        self.seen_foreign_keys.insert(id)
    }
}

/// Opening lines of a collapsible block.
pub fn open_block(summary: &str) -> String {
    format!("<details>\n<summary>{summary}</summary>\n\n")
}

/// Closing lines of a collapsible block.
pub fn close_block() -> &'static str {
    "\n</details>\n"
}

fn preamble(ctx: &RenderContext) -> String {
    let engine = ctx.engine();
    let mut out = String::new();
    out.push_str(&format!("# {engine} Database Schema\n\n"));
    out.push_str(&format!(
        "This file outlines the schema of a {engine} database, detailing all tables, columns, and their relationships. \
         The relationships are depicted using symbols to represent the type and direction of connections between tables, based on foreign keys.\n\n"
    ));
    out.push_str("### Relationship Symbols:\n");
    for cardinality in Cardinality::LEGEND_ORDER {
        out.push_str(&format!(
            "- `{}`: {}\n",
            cardinality.symbol(),
            cardinality.description()
        ));
    }
    out.push('\n');
    out.push_str("### Primary Key Indication:\n");
    out.push_str(
        "- `#` : If a column name starts with a `#` it means that it is the primary key of the table.\n\n",
    );
    out.push_str(&format!(
        "## {engine} Table Schema for Database: {}\n\n",
        ctx.database()
    ));
    out
}

/// Renders the preamble and one block per table.
///
/// `rows` must be grouped by table (the catalog query orders them by table
/// and ordinal position). A foreign-key column gets its relationship
/// annotation only the first time its `(table, column, constraint)` triple is
/// seen in `ctx`; later rows still emit the bullet. The fragment ends with the
/// number of distinct foreign keys.
pub fn render_tables(rows: &[ColumnRow], ctx: &mut RenderContext) -> String {
    let mut out = preamble(ctx);
    let mut current_table: Option<&str> = None;
    let mut table_count = 0usize;

    for row in rows {
        if current_table != Some(row.table.as_str()) {
            if current_table.is_some() {
                out.push_str(close_block());
                out.push('\n');
            }
            out.push_str(&open_block(&row.table));
            current_table = Some(row.table.as_str());
            table_count += 1;
        }

        let marker = if row.is_primary { "#" } else { "" };
        let mut display = format!("- {marker}{}", row.column);

        if let Some(id) = row.foreign_key_id()
            && ctx.mark_foreign_key(id)
        {
            display = format!("- {marker}{}", describe_row(row));
            if let Some(constraint) = row.constraint_name.as_deref() {
                let _ = write!(display, " (FK: {constraint})");
            }
        }

        let _ = writeln!(out, "  {display}");
    }

    if current_table.is_some() {
        out.push_str(close_block());
    }

    let _ = write!(
        out,
        "\n - Total Unique Foreign Keys: {}\n\n\n",
        ctx.unique_foreign_keys()
    );

    tracing::debug!(
        "Rendered {} tables with {} unique foreign keys",
        table_count,
        ctx.unique_foreign_keys()
    );
    out
}

/// Renders the stored procedure section, one block per category.
///
/// Every category gets a block, even when it is empty.
pub fn render_procedures(categorized: &CategorizedProcedures, ctx: &RenderContext) -> String {
    let mut out = format!(
        "## {} Stored Procedure Categories for Database: {}\n\n",
        ctx.engine(),
        ctx.database()
    );
    out.push_str(
        "This section categorizes stored procedures based on their inferred functionality from their names.\n\n",
    );

    for (category, procs) in categorized.iter() {
        out.push_str(&open_block(category.label()));
        for name in procs {
            let _ = writeln!(out, "- {name} ({})", describe_procedure(name));
        }
        out.push_str(close_block());
        out.push('\n');
    }

    tracing::debug!("Rendered {} procedures", categorized.len());
    out
}

/// Wraps externally produced analysis so it can be appended to the document.
pub fn render_external(content: &str) -> String {
    format!("\n\n{content}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedures::categorize_procedures;

    fn shop_rows() -> Vec<ColumnRow> {
        vec![
            ColumnRow::new("orders", "id").primary(),
            ColumnRow::new("orders", "user_id").references("fk_orders_user", "users", "id", true),
            ColumnRow::new("users", "id").primary(),
            ColumnRow::new("users", "email").unique(),
        ]
    }

    #[test]
    fn test_preamble_and_heading() {
        let mut ctx = RenderContext::new("shop");
        let doc = render_tables(&[], &mut ctx);

        assert!(doc.starts_with("# MySQL Database Schema\n\n"));
        assert!(doc.contains("### Relationship Symbols:\n- `<<-->>`: Many-to-Many"));
        assert!(doc.contains("- `<-->`: One-to-One Relationship."));
        assert!(doc.contains("### Primary Key Indication:\n"));
        assert!(doc.contains("## MySQL Table Schema for Database: shop\n\n"));
    }

    #[test]
    fn test_empty_table_set_has_no_blocks() {
        let mut ctx = RenderContext::new("shop");
        let doc = render_tables(&[], &mut ctx);

        assert!(!doc.contains("<details>"));
        assert!(!doc.contains("</details>"));
        assert!(doc.ends_with("\n - Total Unique Foreign Keys: 0\n\n\n"));
    }

    #[test]
    fn test_table_blocks() {
        let mut ctx = RenderContext::new("shop");
        let doc = render_tables(&shop_rows(), &mut ctx);

        let expected_body = "<details>\n<summary>orders</summary>\n\n\
            \x20 - #id\n\
            \x20 - user_id <<--> users.id (FK: fk_orders_user)\n\
            \n</details>\n\
            \n\
            <details>\n<summary>users</summary>\n\n\
            \x20 - #id\n\
            \x20 - email\n\
            \n</details>\n\
            \n - Total Unique Foreign Keys: 1\n\n\n";
        assert!(doc.ends_with(expected_body), "unexpected document:\n{doc}");
    }

    #[test]
    fn test_duplicate_foreign_key_rows_annotated_once() {
        let row = ColumnRow::new("orders", "user_id").references("fk_orders_user", "users", "id", true);
        let rows = vec![
            row.clone(),
            row.clone(),
            row,
            ColumnRow::new("orders", "shop_id").references("fk_orders_shop", "shops", "id", true),
        ];

        let mut ctx = RenderContext::new("shop");
        let doc = render_tables(&rows, &mut ctx);

        assert_eq!(doc.matches("(FK: fk_orders_user)").count(), 1);
        assert_eq!(doc.matches("  - user_id\n").count(), 2);
        assert_eq!(ctx.unique_foreign_keys(), 2);
        assert!(doc.contains(" - Total Unique Foreign Keys: 2\n"));
    }

    #[test]
    fn test_foreign_key_without_constraint_is_not_annotated() {
        let mut row = ColumnRow::new("orders", "user_id").references("x", "users", "id", true);
        row.constraint_name = None;

        let mut ctx = RenderContext::new("shop");
        let doc = render_tables(&[row], &mut ctx);

        assert!(doc.contains("  - user_id\n"));
        assert_eq!(ctx.unique_foreign_keys(), 0);
    }

    #[test]
    fn test_primary_foreign_key_uses_one_to_one_symbol() {
        let row = ColumnRow::new("profiles", "user_id")
            .primary()
            .references("fk_profile_user", "users", "id", true);

        let mut ctx = RenderContext::new("shop");
        let doc = render_tables(&[row], &mut ctx);

        assert!(doc.contains("  - #user_id <--> users.id (FK: fk_profile_user)\n"));
    }

    #[test]
    fn test_render_procedures() {
        let ctx = RenderContext::new("shop");
        let categorized = categorize_procedures(["addUser", "getNextId"]);
        let doc = render_procedures(&categorized, &ctx);

        assert!(doc.starts_with("## MySQL Stored Procedure Categories for Database: shop\n\n"));
        assert!(doc.contains(
            "<details>\n<summary>Create/Add</summary>\n\n- addUser (Add User)\n\n</details>\n\n"
        ));
        assert!(doc.contains("- getNextId (Get Next Id)\n"));
        assert_eq!(doc.matches("<details>").count(), 6);
        assert_eq!(doc.matches("</details>").count(), 6);
    }

    #[test]
    fn test_custom_engine_label() {
        let mut ctx = RenderContext::new("warehouse").with_engine("MariaDB");
        let doc = render_tables(&[], &mut ctx);
        assert!(doc.starts_with("# MariaDB Database Schema"));
        assert!(doc.contains("## MariaDB Table Schema for Database: warehouse"));
    }
}
