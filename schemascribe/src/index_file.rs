//! Index file generation.
//!
//! The index is always built from the document as read back from disk.

use clap::ValueEnum;
use schemascribe_core::{Result, SchemaIndex, error::ScribeError};
use std::path::{Path, PathBuf};

/// Index output formats.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexFormat {
    /// YAML-style lookup file
    #[default]
    Yaml,
    /// JSON object
    Json,
}

impl IndexFormat {
    /// File extension for the format.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yml",
            Self::Json => "json",
        }
    }
}

/// Index path next to `document`: `<stem> Index.<ext>`.
///
/// `MySQL Database Schema.md` becomes `MySQL Database Schema Index.yml`.
pub fn default_index_path(document: &Path, format: IndexFormat) -> PathBuf {
    let stem = document
        .file_stem()
        .map_or_else(|| "schema".into(), |s| s.to_string_lossy());
    document.with_file_name(format!("{} Index.{}", stem, format.extension()))
}

/// Engine and database names from the document's table heading.
///
/// Returns `None` when the document has no `## <engine> Table Schema for
/// Database: <db>` heading.
pub fn document_identity(document: &str) -> Option<(String, String)> {
    document.lines().find_map(|line| {
        let heading = line.strip_prefix("## ")?;
        let (engine, database) = heading.split_once(" Table Schema for Database: ")?;
        Some((engine.trim().to_string(), database.trim().to_string()))
    })
}

/// Scans `document_path` and writes its index to `index_path`.
///
/// # Errors
/// Returns an I/O error for unreadable or unwritable files and an index
/// error when the document's blocks are malformed.
pub async fn write_index(
    document_path: &Path,
    index_path: &Path,
    format: IndexFormat,
    engine: &str,
    database: &str,
) -> Result<SchemaIndex> {
    let document = tokio::fs::read_to_string(document_path)
        .await
        .map_err(|e| ScribeError::io(format!("Failed to read {}", document_path.display()), e))?;

    let index = SchemaIndex::scan(&document)?;

    let rendered = match format {
        IndexFormat::Yaml => {
            let document_name = document_path
                .file_name()
                .map_or_else(|| document_path.display().to_string(), |n| {
                    n.to_string_lossy().into_owned()
                });
            index.render_yaml(engine, database, &document_name)
        }
        IndexFormat::Json => index.render_json()?,
    };

    tokio::fs::write(index_path, rendered)
        .await
        .map_err(|e| ScribeError::io(format!("Failed to write {}", index_path.display()), e))?;

    tracing::info!(
        "Indexed {} blocks in {} sections",
        index.block_count(),
        index.sections().len()
    );
    Ok(index)
}
