//! View dependency listing.

use crate::markdown::{close_block, open_block};
use crate::models::ViewTableUsage;
use std::collections::BTreeSet;

/// Tables read by each view.
///
/// Views keep the order in which they were first seen; table names within a
/// view are deduplicated and sorted so the rendered section is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewUsage {
    views: Vec<(String, BTreeSet<String>)>,
}

impl ViewUsage {
    /// Accumulates catalog usage rows into a per-view table set.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a ViewTableUsage>,
    {
        let mut usage = Self::default();
        for row in rows {
            usage.insert(&row.view, &row.table);
        }
        usage
    }

    /// Records that `view` reads from `table`.
    pub fn insert(&mut self, view: &str, table: &str) {
        match self.views.iter_mut().find(|(name, _)| name == view) {
            Some((_, tables)) => {
                tables.insert(table.to_string());
            }
            None => self
                .views
                .push((view.to_string(), BTreeSet::from([table.to_string()]))),
        }
    }

    /// Iterates over views and their sorted source tables.
    pub fn iter(&self) -> impl Iterator<Item = (&str, impl Iterator<Item = &str>)> {
        self.views
            .iter()
            .map(|(view, tables)| (view.as_str(), tables.iter().map(String::as_str)))
    }

    /// Number of views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether there are no views.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Renders the "Database Views" section appended after the procedures.
///
/// Each view becomes a collapsible block listing the tables it uses.
pub fn render_views(usage: &ViewUsage) -> String {
    let blocks: Vec<String> = usage
        .iter()
        .map(|(view, tables)| {
            let mut block = open_block(view);
            for table in tables {
                block.push_str(&format!("  - Uses table `{table}`\n"));
            }
            block.push_str(close_block());
            block
        })
        .collect();

    tracing::debug!("Rendered {} view blocks", blocks.len());
    format!("\n## Database Views\n\n{}", blocks.join("\n"))
}
