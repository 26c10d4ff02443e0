//! File output for collected snapshots.

use schemascribe_core::{Result, SchemaSnapshot, error::ScribeError};
use std::path::Path;

/// Writes `snapshot` to `output_path` as pretty-printed JSON, replacing any
/// existing file.
///
/// # Errors
/// Returns error if serialization or the write fails.
pub async fn save_snapshot(snapshot: &SchemaSnapshot, output_path: &Path) -> Result<()> {
    let json_data = snapshot.to_json()?;

    tokio::fs::write(output_path, json_data)
        .await
        .map_err(|e| {
            ScribeError::io(format!("Failed to write to {}", output_path.display()), e)
        })?;

    tracing::debug!("Wrote snapshot to {}", output_path.display());
    Ok(())
}

/// One-line summary printed after a successful collection.
pub fn snapshot_summary(snapshot: &SchemaSnapshot) -> String {
    let view_count = snapshot
        .views
        .iter()
        .map(|usage| usage.view.as_str())
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    format!(
        "Database: {} | Tables: {} | Procedures: {} | Views: {}",
        snapshot.database,
        snapshot.table_count(),
        snapshot.procedures.len(),
        view_count
    )
}
