//! MySQL metadata source.
//!
//! # Module Structure
//! - `connection`: connection URL parsing and pool setup
//! - `catalog`: `INFORMATION_SCHEMA` queries and row decoding
//!
//! All queries are read-only and scoped to the database named in the
//! connection URL.

pub mod catalog;
pub mod connection;


use super::{ConnectionConfig, MetadataSource};
use crate::Result;
use crate::models::{ColumnRow, ViewTableUsage};
use async_trait::async_trait;
use sqlx::MySqlPool;

pub use connection::{parse_mysql_connection_config, validate_mysql_connection_string};

/// MySQL metadata source backed by a single-connection pool.
pub struct MySqlSource {
    /// Connection pool for catalog queries
    pub pool: MySqlPool,
    /// Connection configuration (credentials excluded)
    pub config: ConnectionConfig,
    database: String,
    engine: &'static str,
}

impl std::fmt::Debug for MySqlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlSource")
            .field("config", &self.config)
            .field("database", &self.database)
            .field("engine", &self.engine)
            .field("pool_size", &self.pool.size())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MetadataSource for MySqlSource {
    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(crate::error::ScribeError::connection_failed)?;

        if connectivity_result != 1 {
            return Err(crate::error::ScribeError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        let schema_access_test: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM INFORMATION_SCHEMA.SCHEMATA WHERE SCHEMA_NAME = ?",
        )
        .bind(&self.database)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            crate::error::ScribeError::insufficient_privileges(format!(
                "Cannot access INFORMATION_SCHEMA: {}",
                e
            ))
        })?;

        if schema_access_test == 0 {
            return Err(crate::error::ScribeError::insufficient_privileges(format!(
                "Database '{}' is not visible to this user",
                self.database
            )));
        }

        Ok(())
    }

    async fn fetch_columns(&self) -> Result<Vec<ColumnRow>> {
        catalog::fetch_columns(&self.pool, &self.database).await
    }

    async fn fetch_procedures(&self) -> Result<Vec<String>> {
        catalog::fetch_procedures(&self.pool, &self.database).await
    }

    async fn fetch_view_usage(&self) -> Result<Vec<ViewTableUsage>> {
        catalog::fetch_view_usage(&self.pool, &self.database).await
    }

    fn database_name(&self) -> &str {
        &self.database
    }

    fn engine_label(&self) -> &'static str {
        self.engine
    }
}
