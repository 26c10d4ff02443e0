//! Writes the Markdown schema document from a snapshot.
//!
//! The tables fragment creates or truncates the file; procedures, views and
//! any external view analysis are appended in that order. A failed write
//! stops the pipeline before the index is generated.

use schemascribe_core::{
    RenderContext, Result, SchemaSnapshot, ViewUsage, categorize_procedures,
    error::ScribeError, markdown, views,
};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Options for one `render` run.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Markdown output path
    pub output: PathBuf,
    /// Engine label used in headings; the snapshot's label when `None`
    pub engine: Option<String>,
    /// Whether to append the view section
    pub include_views: bool,
    /// Externally produced analysis appended when the file exists
    pub view_analysis: Option<PathBuf>,
}

impl RenderOptions {
    /// Options writing to `output` with the snapshot's engine label and
    /// views included.
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            engine: None,
            include_views: true,
            view_analysis: None,
        }
    }
}

/// Counts reported after a document is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    /// Table blocks written
    pub tables: usize,
    /// Distinct foreign keys annotated
    pub unique_foreign_keys: usize,
    /// Stored procedures listed
    pub procedures: usize,
    /// View blocks written
    pub views: usize,
    /// Whether external view analysis was appended
    pub external_appended: bool,
}

/// Reads and validates a snapshot file.
///
/// # Errors
/// Returns an I/O error if the file cannot be read, or the parse and version
/// errors from [`SchemaSnapshot::from_json`].
pub async fn load_snapshot(path: &Path) -> Result<SchemaSnapshot> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ScribeError::io(format!("Failed to read {}", path.display()), e))?;
    SchemaSnapshot::from_json(&json)
}

/// Writes the full document for `snapshot`.
///
/// # Errors
/// Returns an I/O error naming the file if any write fails.
pub async fn write_document(
    snapshot: &SchemaSnapshot,
    options: &RenderOptions,
) -> Result<DocumentStats> {
    let output = options.output.as_path();
    let engine = options.engine.as_deref().unwrap_or(&snapshot.engine);
    let mut ctx = RenderContext::new(&snapshot.database).with_engine(engine);
    let mut stats = DocumentStats {
        tables: snapshot.table_count(),
        procedures: snapshot.procedures.len(),
        ..DocumentStats::default()
    };

    let tables = markdown::render_tables(&snapshot.columns, &mut ctx);
    tokio::fs::write(output, tables)
        .await
        .map_err(|e| ScribeError::io(format!("Failed to write {}", output.display()), e))?;
    stats.unique_foreign_keys = ctx.unique_foreign_keys();
    tracing::info!(
        "Wrote {} tables ({} unique foreign keys)",
        stats.tables,
        stats.unique_foreign_keys
    );

    let categorized = categorize_procedures(snapshot.procedures.iter().map(String::as_str));
    append(output, &markdown::render_procedures(&categorized, &ctx)).await?;
    tracing::info!("Appended {} stored procedures", stats.procedures);

    if options.include_views {
        let usage = ViewUsage::from_rows(&snapshot.views);
        stats.views = usage.len();
        append(output, &views::render_views(&usage)).await?;
        tracing::info!("Appended {} views", stats.views);
    } else {
        tracing::debug!("View section disabled");
    }

    if let Some(path) = options.view_analysis.as_deref() {
        stats.external_appended = append_external(output, path).await?;
    }

    Ok(stats)
}

/// Appends the contents of `analysis` when it exists.
async fn append_external(output: &Path, analysis: &Path) -> Result<bool> {
    let exists = tokio::fs::try_exists(analysis)
        .await
        .map_err(|e| ScribeError::io(format!("Failed to check {}", analysis.display()), e))?;
    if !exists {
        tracing::info!("No view analysis at {}, skipping", analysis.display());
        return Ok(false);
    }

    let content = tokio::fs::read_to_string(analysis)
        .await
        .map_err(|e| ScribeError::io(format!("Failed to read {}", analysis.display()), e))?;
    append(output, &markdown::render_external(&content)).await?;
    tracing::info!("Appended view analysis from {}", analysis.display());
    Ok(true)
}

async fn append(path: &Path, fragment: &str) -> Result<()> {
    let context = || format!("Failed to append to {}", path.display());
    let mut file = tokio::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .await
        .map_err(|e| ScribeError::io(context(), e))?;
    file.write_all(fragment.as_bytes())
        .await
        .map_err(|e| ScribeError::io(context(), e))?;
    file.flush().await.map_err(|e| ScribeError::io(context(), e))
}
