//! Tests for the metadata models.

use super::*;

#[test]
fn test_foreign_key_target_requires_both_sides() {
    let row = ColumnRow::new("orders", "user_id").references("fk_user", "users", "id", true);
    assert_eq!(row.foreign_key_target(), Some(("users", "id")));

    let mut missing_column = row.clone();
    missing_column.ref_column = None;
    assert_eq!(missing_column.foreign_key_target(), None);

    let mut empty_table = row;
    empty_table.ref_table = Some(String::new());
    assert_eq!(empty_table.foreign_key_target(), None);
}

#[test]
fn test_foreign_key_id_requires_constraint() {
    let row = ColumnRow::new("orders", "user_id").references("fk_user", "users", "id", true);
    let id = row.foreign_key_id().unwrap();
    assert_eq!(id.to_string(), "orders.user_id.fk_user");

    let mut unnamed = row;
    unnamed.constraint_name = None;
    assert!(unnamed.foreign_key_id().is_none());

    assert!(ColumnRow::new("users", "id").primary().foreign_key_id().is_none());
}

#[test]
fn test_source_uniqueness() {
    assert!(ColumnRow::new("users", "id").primary().is_source_unique());
    assert!(ColumnRow::new("users", "email").unique().is_source_unique());
    assert!(!ColumnRow::new("users", "name").is_source_unique());
}

#[test]
fn test_snapshot_json_round_trip_keeps_rows() {
    let mut snapshot = SchemaSnapshot::new("shop").with_engine("MariaDB");
    snapshot.columns.push(ColumnRow::new("users", "id").primary());
    snapshot
        .columns
        .push(ColumnRow::new("orders", "user_id").references("fk_user", "users", "id", true));
    snapshot.procedures.push("addUser".to_string());
    snapshot.views.push(ViewTableUsage::new("active_users", "users"));

    let json = snapshot.to_json().unwrap();
    let parsed = SchemaSnapshot::from_json(&json).unwrap();

    assert_eq!(parsed.database, "shop");
    assert_eq!(parsed.engine, "MariaDB");
    assert_eq!(parsed.columns, snapshot.columns);
    assert_eq!(parsed.procedures, vec!["addUser".to_string()]);
    assert_eq!(parsed.views, snapshot.views);
}

#[test]
fn test_snapshot_rejects_unknown_version() {
    let mut snapshot = SchemaSnapshot::new("shop");
    snapshot.format_version = "9.9".to_string();
    let json = snapshot.to_json().unwrap();

    let error = SchemaSnapshot::from_json(&json).unwrap_err();
    assert!(error.to_string().contains("9.9"));
}

#[test]
fn test_snapshot_optional_sections_default_to_empty() {
    let json = r#"{
        "format_version": "1.0",
        "database": "shop",
        "collected_at": "2024-01-01T00:00:00Z",
        "collector_version": "0.1.0",
        "columns": [{"table": "users", "column": "id", "is_primary": true}]
    }"#;

    let snapshot = SchemaSnapshot::from_json(json).unwrap();
    assert_eq!(snapshot.engine, "MySQL");
    assert!(snapshot.procedures.is_empty());
    assert!(snapshot.views.is_empty());
    assert!(snapshot.columns[0].ref_table.is_none());
    assert!(!snapshot.columns[0].ref_is_unique);
}

#[test]
fn test_table_count_counts_runs() {
    let mut snapshot = SchemaSnapshot::new("shop");
    assert_eq!(snapshot.table_count(), 0);

    snapshot.columns = vec![
        ColumnRow::new("orders", "id"),
        ColumnRow::new("orders", "total"),
        ColumnRow::new("users", "id"),
    ];
    assert_eq!(snapshot.table_count(), 2);
}
