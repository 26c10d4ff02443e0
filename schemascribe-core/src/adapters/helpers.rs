//! Row decoding helpers shared by the catalog queries.

use crate::{Result, error::ScribeError};
use sqlx::{Row, mysql::MySqlRow};

/// Extension trait for extracting typed values from catalog rows with
/// consistent error context.
///
/// # Example
/// ```rust,ignore
/// use schemascribe_core::adapters::helpers::RowExt;
///
/// let name: String = row.get_field("TABLE_NAME", Some("COLUMNS"))?;
/// ```
pub trait RowExt {
    /// Extracts a typed field from the row.
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>;

    /// Extracts a nullable string, mapping empty strings to `None`.
    fn get_optional_name(&self, field_name: &str, table_context: Option<&str>)
    -> Result<Option<String>>;

    /// Extracts an integer flag or count as a boolean (`> 0`).
    fn get_flag(&self, field_name: &str, table_context: Option<&str>) -> Result<bool>;
}

impl RowExt for MySqlRow {
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
    {
        self.try_get(field_name)
            .map_err(|e| ScribeError::parse_field(field_name, table_context, e))
    }

    fn get_optional_name(
        &self,
        field_name: &str,
        table_context: Option<&str>,
    ) -> Result<Option<String>> {
        let value: Option<String> = self.get_field(field_name, table_context)?;
        Ok(value.filter(|v| !v.is_empty()))
    }

    fn get_flag(&self, field_name: &str, table_context: Option<&str>) -> Result<bool> {
        let value: Option<i64> = self.get_field(field_name, table_context)?;
        Ok(value.unwrap_or(0) > 0)
    }
}
