//! Metadata sources and the factory that selects one from a connection URL.
//!
//! A [`MetadataSource`] reads the catalog rows the document pipeline needs:
//! column/key rows, stored procedure names and view/table usage. Sources are
//! read-only and never expose credentials.
//!
//! # Module Structure
//! - `config`: connection configuration
//! - `helpers`: row decoding helpers
//! - `mysql`: MySQL `INFORMATION_SCHEMA` source (feature `mysql`)

use crate::Result;
use crate::models::{ColumnRow, SchemaSnapshot, ViewTableUsage};
use async_trait::async_trait;

pub mod config;

pub use config::ConnectionConfig;

/// Read-only access to a database's metadata catalogs.
///
/// Object-safe so the binaries can hold a `Box<dyn MetadataSource>`.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Tests the connection and catalog access without collecting anything.
    ///
    /// # Errors
    /// Returns error if connection fails or the catalogs are not readable
    async fn test_connection(&self) -> Result<()>;

    /// Column rows of every base table, ordered by table then ordinal position.
    async fn fetch_columns(&self) -> Result<Vec<ColumnRow>>;

    /// Names of all stored procedures.
    async fn fetch_procedures(&self) -> Result<Vec<String>>;

    /// View/table usage rows, ordered by view name.
    async fn fetch_view_usage(&self) -> Result<Vec<ViewTableUsage>>;

    /// Name of the database being documented.
    fn database_name(&self) -> &str;

    /// Engine label used in document headings.
    fn engine_label(&self) -> &'static str;

    /// Collects all metadata into a snapshot.
    ///
    /// Columns and procedures are required; a failure to read view usage is
    /// logged and leaves the view list empty, since older servers lack the
    /// catalog table.
    async fn collect_snapshot(&self) -> Result<SchemaSnapshot> {
        let start_time = std::time::Instant::now();
        let mut snapshot =
            SchemaSnapshot::new(self.database_name()).with_engine(self.engine_label());

        tracing::debug!("Collecting column metadata");
        snapshot.columns = self.fetch_columns().await?;
        tracing::info!(
            "Collected {} columns across {} tables",
            snapshot.columns.len(),
            snapshot.table_count()
        );

        tracing::debug!("Collecting stored procedures");
        snapshot.procedures = self.fetch_procedures().await?;
        tracing::info!("Collected {} stored procedures", snapshot.procedures.len());

        snapshot.views = match self.fetch_view_usage().await {
            Ok(views) => {
                tracing::info!("Collected {} view usage rows", views.len());
                views
            }
            Err(e) => {
                tracing::warn!("Failed to collect view usage: {}", e);
                Vec::new()
            }
        };

        tracing::info!(
            "Metadata collection completed in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
        Ok(snapshot)
    }
}

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseEngine {
    /// MySQL or MariaDB (`mysql://`, `mariadb://`)
    MySql,
}

impl std::fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MySql => write!(f, "MySQL"),
        }
    }
}

/// Creates a metadata source for a connection URL.
///
/// # Errors
/// Returns error if:
/// - The URL scheme is not recognised
/// - Support for the engine was not compiled in
/// - The URL fails validation
pub async fn create_source(connection_string: &str) -> Result<Box<dyn MetadataSource>> {
    match detect_engine(connection_string)? {
        #[cfg(feature = "mysql")]
        DatabaseEngine::MySql => {
            let source = mysql::MySqlSource::new(connection_string).await?;
            Ok(Box::new(source))
        }
        #[cfg(not(feature = "mysql"))]
        DatabaseEngine::MySql => Err(crate::error::ScribeError::unsupported_feature(
            "MySQL source",
            "Compile with --features mysql to enable MySQL support",
        )),
    }
}

/// Safely redacts credentials from database connection URLs.
#[inline]
pub fn redact_database_url(url: &str) -> String {
    crate::error::redact_database_url(url)
}

/// Detects the engine from a connection URL's scheme.
///
/// # Errors
/// Returns error if connection string format is unrecognized
pub fn detect_engine(connection_string: &str) -> Result<DatabaseEngine> {
    if connection_string.starts_with("mysql://") || connection_string.starts_with("mariadb://") {
        Ok(DatabaseEngine::MySql)
    } else {
        Err(crate::error::ScribeError::configuration(
            "Unrecognized database connection string format",
        ))
    }
}

#[cfg(feature = "mysql")]
pub mod helpers;

#[cfg(feature = "mysql")]
pub mod mysql;
