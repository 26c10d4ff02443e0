//! `INFORMATION_SCHEMA` queries for the column, procedure and view catalogs.
//!
//! Identifier columns are cast to CHAR because MySQL 8.0 reports several
//! catalog columns as VARBINARY; key flags are cast to SIGNED so they decode
//! as `i64` on every server version.

use crate::Result;
use crate::adapters::helpers::RowExt;
use crate::error::ScribeError;
use crate::models::{ColumnRow, ViewTableUsage};
use sqlx::MySqlPool;

const COLUMNS_QUERY: &str = r#"
    SELECT
        CAST(t.TABLE_NAME AS CHAR) AS table_name,
        CAST(c.COLUMN_NAME AS CHAR) AS column_name,
        CAST(IF((SELECT COUNT(*)
            FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS AS tc
            JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE AS kcu
                ON tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
                AND tc.TABLE_SCHEMA = kcu.TABLE_SCHEMA
                AND tc.TABLE_NAME = kcu.TABLE_NAME
            WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY'
                AND tc.TABLE_SCHEMA = c.TABLE_SCHEMA
                AND tc.TABLE_NAME = c.TABLE_NAME
                AND kcu.COLUMN_NAME = c.COLUMN_NAME) > 0, 1, 0) AS SIGNED) AS is_primary,
        CAST(k.REFERENCED_TABLE_NAME AS CHAR) AS ref_table,
        CAST(k.REFERENCED_COLUMN_NAME AS CHAR) AS ref_column,
        CAST(COALESCE((SELECT COUNT(*)
            FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS AS tc
            JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE AS kcu
                ON tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
                AND tc.TABLE_SCHEMA = kcu.TABLE_SCHEMA
                AND tc.TABLE_NAME = kcu.TABLE_NAME
            WHERE tc.CONSTRAINT_TYPE = 'UNIQUE'
                AND tc.TABLE_SCHEMA = c.TABLE_SCHEMA
                AND tc.TABLE_NAME = c.TABLE_NAME
                AND kcu.COLUMN_NAME = c.COLUMN_NAME), 0) AS SIGNED) AS is_unique,
        CAST(COALESCE((SELECT COUNT(*)
            FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS AS tc
            JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE AS kcu
                ON tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
                AND tc.TABLE_SCHEMA = kcu.TABLE_SCHEMA
                AND tc.TABLE_NAME = kcu.TABLE_NAME
            WHERE tc.CONSTRAINT_TYPE = 'UNIQUE'
                AND tc.TABLE_SCHEMA = k.REFERENCED_TABLE_SCHEMA
                AND tc.TABLE_NAME = k.REFERENCED_TABLE_NAME
                AND kcu.COLUMN_NAME = k.REFERENCED_COLUMN_NAME), 0) AS SIGNED) AS ref_is_unique,
        CAST(k.CONSTRAINT_NAME AS CHAR) AS constraint_name
    FROM INFORMATION_SCHEMA.TABLES AS t
    JOIN INFORMATION_SCHEMA.COLUMNS AS c
        ON t.TABLE_SCHEMA = c.TABLE_SCHEMA AND t.TABLE_NAME = c.TABLE_NAME
    LEFT JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE AS k
        ON c.TABLE_SCHEMA = k.TABLE_SCHEMA
        AND c.TABLE_NAME = k.TABLE_NAME
        AND c.COLUMN_NAME = k.COLUMN_NAME
        AND k.REFERENCED_TABLE_SCHEMA IS NOT NULL
    WHERE t.TABLE_SCHEMA = ?
        AND t.TABLE_TYPE = 'BASE TABLE'
    ORDER BY t.TABLE_NAME, c.ORDINAL_POSITION
"#;

const PROCEDURES_QUERY: &str = r#"
    SELECT CAST(ROUTINE_NAME AS CHAR) AS routine_name
    FROM INFORMATION_SCHEMA.ROUTINES
    WHERE ROUTINE_SCHEMA = ? AND ROUTINE_TYPE = 'PROCEDURE'
    ORDER BY ROUTINE_NAME
"#;

const VIEW_USAGE_QUERY: &str = r#"
    SELECT
        CAST(VIEW_NAME AS CHAR) AS view_name,
        CAST(TABLE_NAME AS CHAR) AS table_name
    FROM INFORMATION_SCHEMA.VIEW_TABLE_USAGE
    WHERE VIEW_SCHEMA = ?
    ORDER BY VIEW_NAME
"#;

/// Reads one row per column of every base table.
///
/// A column that takes part in several foreign keys yields one row per key.
pub(crate) async fn fetch_columns(pool: &MySqlPool, database: &str) -> Result<Vec<ColumnRow>> {
    let rows = sqlx::query(COLUMNS_QUERY)
        .bind(database)
        .fetch_all(pool)
        .await
        .map_err(|e| ScribeError::collection_failed("Failed to collect column metadata", e))?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let table: String = row.get_field("table_name", Some("COLUMNS"))?;
        let column: String = row.get_field("column_name", Some(&table))?;

        columns.push(ColumnRow {
            is_primary: row.get_flag("is_primary", Some(&table))?,
            ref_table: row.get_optional_name("ref_table", Some(&table))?,
            ref_column: row.get_optional_name("ref_column", Some(&table))?,
            is_unique: row.get_flag("is_unique", Some(&table))?,
            ref_is_unique: row.get_flag("ref_is_unique", Some(&table))?,
            constraint_name: row.get_optional_name("constraint_name", Some(&table))?,
            table,
            column,
        });
    }

    tracing::debug!("Decoded {} column rows for {}", columns.len(), database);
    Ok(columns)
}

/// Reads the names of all stored procedures, sorted by name.
pub(crate) async fn fetch_procedures(pool: &MySqlPool, database: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(PROCEDURES_QUERY)
        .bind(database)
        .fetch_all(pool)
        .await
        .map_err(|e| ScribeError::collection_failed("Failed to collect stored procedures", e))?;

    let mut procedures = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.get_field("routine_name", Some("ROUTINES"))?;
        procedures.push(name);
    }
    Ok(procedures)
}

/// Reads the view/table usage pairs, sorted by view name.
pub(crate) async fn fetch_view_usage(
    pool: &MySqlPool,
    database: &str,
) -> Result<Vec<ViewTableUsage>> {
    let rows = sqlx::query(VIEW_USAGE_QUERY)
        .bind(database)
        .fetch_all(pool)
        .await
        .map_err(|e| ScribeError::collection_failed("Failed to collect view table usage", e))?;

    rows.iter()
        .map(|row| {
            Ok(ViewTableUsage {
                view: row.get_field("view_name", Some("VIEW_TABLE_USAGE"))?,
                table: row.get_field("table_name", Some("VIEW_TABLE_USAGE"))?,
            })
        })
        .collect()
}
