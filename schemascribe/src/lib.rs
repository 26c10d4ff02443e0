//! Library module for schemascribe
//!
//! Document writing and index generation are exposed here for the
//! integration tests. The command-line entry point is in main.rs.

pub mod document;
pub mod index_file;

pub use document::{DocumentStats, RenderOptions, load_snapshot, write_document};
pub use index_file::{IndexFormat, default_index_path, document_identity, write_index};

/// Default Markdown document name.
pub const DEFAULT_DOCUMENT: &str = "MySQL Database Schema.md";

/// Default snapshot consumed by `render`.
pub const DEFAULT_SNAPSHOT: &str = "schema.snapshot.json";
