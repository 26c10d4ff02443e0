//! Core data structures and rendering for SchemaScribe.
//!
//! This crate is shared by the collector and renderer binaries. The
//! collector reads a database's metadata catalogs into a [`SchemaSnapshot`];
//! the renderer turns a snapshot into a Markdown schema document and builds
//! a line-number index over that document.
//!
//! # Security Guarantees
//! - No credentials stored or logged in any data structures
//! - All database sessions are read-only
//! - Connection strings are redacted in every error message
//!
//! # Architecture
//! - [`adapters`]: metadata sources behind the [`MetadataSource`] trait
//! - [`relationship`], [`procedures`], [`views`]: pure classification
//! - [`markdown`]: document fragments in write order
//! - [`index`]: scanner that maps sections and blocks to line ranges

pub mod adapters;
pub mod error;
pub mod index;
pub mod logging;
pub mod markdown;
pub mod models;
pub mod procedures;
pub mod relationship;
pub mod security;
pub mod views;

// Re-export commonly used types
pub use adapters::{ConnectionConfig, DatabaseEngine, MetadataSource};
pub use error::{IndexError, Result, ScribeError};
pub use index::{LineSpan, SchemaIndex};
pub use logging::init_logging;
pub use markdown::RenderContext;
pub use models::{ColumnRow, SchemaSnapshot, ViewTableUsage};
pub use procedures::{CategorizedProcedures, ProcedureCategory, categorize_procedures};
pub use relationship::Cardinality;
pub use views::ViewUsage;
