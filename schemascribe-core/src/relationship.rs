//! Cardinality inference for foreign-key relationships.
//!
//! The classification only looks at whether each side of a foreign key is
//! unique. Junction tables are not detected, so two non-unique sides always
//! read as many-to-many.

use crate::models::ColumnRow;
use std::fmt;

/// Relationship cardinality between a column and the column it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Both sides unique: `<-->`
    OneToOne,
    /// Source unique, target not: `<-->>`
    OneToManyLeft,
    /// Target unique, source not: `<<-->`
    OneToManyRight,
    /// Neither side unique: `<<-->>`
    ManyToMany,
}

impl Cardinality {
    /// All cardinalities in the order the document legend lists them.
    pub const LEGEND_ORDER: [Self; 4] = [
        Self::ManyToMany,
        Self::OneToManyRight,
        Self::OneToManyLeft,
        Self::OneToOne,
    ];

    /// Classifies a relationship from the uniqueness of both sides.
    pub fn classify(source_unique: bool, target_unique: bool) -> Self {
        match (source_unique, target_unique) {
            (true, true) => Self::OneToOne,
            (true, false) => Self::OneToManyLeft,
            (false, true) => Self::OneToManyRight,
            (false, false) => Self::ManyToMany,
        }
    }

    /// The symbol used in the rendered document.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::OneToOne => "<-->",
            Self::OneToManyLeft => "<-->>",
            Self::OneToManyRight => "<<-->",
            Self::ManyToMany => "<<-->>",
        }
    }

    /// Legend text explaining the symbol.
    pub fn description(self) -> &'static str {
        match self {
            Self::ManyToMany => {
                "Many-to-Many Relationship. Multiple records in one table are associated with multiple records in another, typically via a junction table."
            }
            Self::OneToManyRight => {
                "One-to-Many Relationship (One on the right). A single record in the right table can be associated with multiple records in the left table."
            }
            Self::OneToManyLeft => {
                "One-to-Many Relationship (One on the left). A single record in the left table can be associated with multiple records in the right table."
            }
            Self::OneToOne => {
                "One-to-One Relationship. A record in one table is associated with only one record in another table."
            }
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Formats a column together with its relationship, if any.
///
/// Returns the bare column name when `target` is `None` or either half of
/// it is empty, regardless of the uniqueness flags.
///
/// # Example
/// ```rust
/// use schemascribe_core::relationship::format_relationship;
///
/// assert_eq!(format_relationship("id", None, true, true), "id");
/// assert_eq!(
///     format_relationship("user_id", Some(("users", "id")), false, true),
///     "user_id <<--> users.id"
/// );
/// ```
pub fn format_relationship(
    column: &str,
    target: Option<(&str, &str)>,
    source_unique: bool,
    target_unique: bool,
) -> String {
    match target {
        Some((ref_table, ref_column)) if !ref_table.is_empty() && !ref_column.is_empty() => {
            let cardinality = Cardinality::classify(source_unique, target_unique);
            format!("{column} {cardinality} {ref_table}.{ref_column}")
        }
        _ => column.to_string(),
    }
}

/// Formats a metadata row's relationship display string.
pub fn describe_row(row: &ColumnRow) -> String {
    format_relationship(
        &row.column,
        row.foreign_key_target(),
        row.is_source_unique(),
        row.ref_is_unique,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_table() {
        let cases = [
            (true, true, "<-->"),
            (true, false, "<-->>"),
            (false, true, "<<-->"),
            (false, false, "<<-->>"),
        ];

        for (source, target, expected) in cases {
            assert_eq!(
                Cardinality::classify(source, target).symbol(),
                expected,
                "source_unique={}, target_unique={}",
                source,
                target
            );
        }
    }

    #[test]
    fn test_no_target_yields_bare_column() {
        for (source, target) in [(true, true), (true, false), (false, true), (false, false)] {
            assert_eq!(format_relationship("email", None, source, target), "email");
        }
        assert_eq!(
            format_relationship("email", Some(("", "id")), true, true),
            "email"
        );
        assert_eq!(
            format_relationship("email", Some(("users", "")), true, true),
            "email"
        );
    }

    #[test]
    fn test_formats_each_cardinality() {
        let target = Some(("users", "id"));
        assert_eq!(
            format_relationship("profile_id", target, true, true),
            "profile_id <--> users.id"
        );
        assert_eq!(
            format_relationship("owner_id", target, true, false),
            "owner_id <-->> users.id"
        );
        assert_eq!(
            format_relationship("user_id", target, false, false),
            "user_id <<-->> users.id"
        );
    }

    #[test]
    fn test_describe_row_uses_unique_flag_as_source_uniqueness() {
        let row = ColumnRow::new("profiles", "user_id")
            .unique()
            .references("fk_profile_user", "users", "id", true);
        assert_eq!(describe_row(&row), "user_id <--> users.id");

        let plain = ColumnRow::new("orders", "user_id")
            .references("fk_order_user", "users", "id", true);
        assert_eq!(describe_row(&plain), "user_id <<--> users.id");
    }

    #[test]
    fn test_legend_covers_every_symbol_once() {
        let symbols: Vec<_> = Cardinality::LEGEND_ORDER
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert_eq!(symbols, vec!["<<-->>", "<<-->", "<-->>", "<-->"]);
    }
}
