//! Integration tests for document rendering and index generation.
//!
//! These tests write real files into a temporary directory and read them
//! back the way a user of the generated index would.

#![allow(clippy::unwrap_used)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::arithmetic_side_effects)]

use schemascribe::{
    IndexFormat, RenderOptions, default_index_path, load_snapshot, write_document, write_index,
};
use schemascribe_core::{ColumnRow, SchemaSnapshot, ViewTableUsage, error::ScribeError};
use std::path::Path;

fn shop_snapshot() -> SchemaSnapshot {
    let mut snapshot = SchemaSnapshot::new("shop");
    snapshot.columns = vec![
        ColumnRow::new("orders", "id").primary(),
        ColumnRow::new("orders", "user_id").references("fk_orders_user", "users", "id", true),
        ColumnRow::new("orders", "user_id").references("fk_orders_user", "users", "id", true),
        ColumnRow::new("users", "id").primary(),
        ColumnRow::new("users", "email").unique(),
    ];
    snapshot.procedures = vec![
        "addUser".to_string(),
        "deleteUser".to_string(),
        "fooBar".to_string(),
    ];
    snapshot.views = vec![
        ViewTableUsage::new("v_orders", "users"),
        ViewTableUsage::new("v_orders", "orders"),
    ];
    snapshot
}

async fn write_snapshot(dir: &Path, snapshot: &SchemaSnapshot) -> std::path::PathBuf {
    let path = dir.join("schema.snapshot.json");
    tokio::fs::write(&path, snapshot.to_json().unwrap()).await.unwrap();
    path
}

/// Asserts that `[start, end]` frames a block labelled `label`.
fn assert_block_at(lines: &[&str], start: usize, end: usize, label: &str) {
    assert_eq!(lines[start - 1], "<details>", "block start for {}", label);
    assert_eq!(
        lines[start],
        format!("<summary>{}</summary>", label),
        "summary for {}",
        label
    );
    assert_eq!(lines[end - 1], "</details>", "block end for {}", label);
}

#[tokio::test]
async fn test_render_document_and_index_integration() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path = write_snapshot(dir.path(), &shop_snapshot()).await;
    let output = dir.path().join("MySQL Database Schema.md");
    let index_path = default_index_path(&output, IndexFormat::Yaml);

    let snapshot = load_snapshot(&snapshot_path).await.unwrap();
    let stats = write_document(&snapshot, &RenderOptions::new(&output))
        .await
        .unwrap();
    assert_eq!(stats.tables, 2);
    assert_eq!(stats.unique_foreign_keys, 1);
    assert_eq!(stats.procedures, 3);
    assert_eq!(stats.views, 1);
    assert!(!stats.external_appended);

    let index = write_index(&output, &index_path, IndexFormat::Yaml, "MySQL", "shop")
        .await
        .unwrap();

    let document = std::fs::read_to_string(&output).unwrap();
    assert!(document.starts_with("# MySQL Database Schema\n"));
    assert!(document.contains("  - user_id <<--> users.id (FK: fk_orders_user)\n"));
    assert_eq!(document.matches("(FK: fk_orders_user)").count(), 1);
    assert!(document.contains(" - Total Unique Foreign Keys: 1\n"));
    assert!(document.contains("- addUser (Add User)\n"));
    assert!(document.contains("  - Uses table `orders`\n  - Uses table `users`\n"));

    let lines: Vec<&str> = document.lines().collect();
    let tables = "MySQL Table Schema for Database: shop";
    let procedures = "MySQL Stored Procedure Categories for Database: shop";
    for (section, detail) in [
        (tables, "orders"),
        (tables, "users"),
        (procedures, "Create/Add"),
        (procedures, "Miscellaneous"),
        ("Database Views", "v_orders"),
    ] {
        let span = index.get(section, detail).unwrap();
        assert_block_at(&lines, span.start, span.end, detail);
    }
    assert_eq!(index.block_count(), 9);

    let yaml = std::fs::read_to_string(&index_path).unwrap();
    assert!(yaml.starts_with("---\nTitle: MySQL Database Schema Index\n"));
    assert!(yaml.contains("Index for `shop` database."));
    assert!(yaml.contains("\"MySQL Database Schema.md\""));
    assert!(yaml.contains("MySQL Table Schema for Database: shop:\n  orders: ["));
    assert!(yaml.ends_with("---"));
}

#[tokio::test]
async fn test_render_replaces_previous_document() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schema.md");
    std::fs::write(&output, "stale content that must disappear\n").unwrap();

    write_document(&shop_snapshot(), &RenderOptions::new(&output))
        .await
        .unwrap();

    let document = std::fs::read_to_string(&output).unwrap();
    assert!(!document.contains("stale content"));
}

#[tokio::test]
async fn test_render_without_views_appends_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schema.md");
    let analysis = dir.path().join("views.md");
    std::fs::write(&analysis, "## View Analysis\nAll views are read-only.\n").unwrap();

    let options = RenderOptions {
        include_views: false,
        view_analysis: Some(analysis),
        ..RenderOptions::new(&output)
    };
    let stats = write_document(&shop_snapshot(), &options).await.unwrap();
    assert_eq!(stats.views, 0);
    assert!(stats.external_appended);

    let document = std::fs::read_to_string(&output).unwrap();
    assert!(!document.contains("## Database Views"));
    assert!(document.ends_with("\n\n## View Analysis\nAll views are read-only.\n"));

    let index_path = dir.path().join("schema.index.yml");
    write_index(&output, &index_path, IndexFormat::Yaml, "MySQL", "shop")
        .await
        .unwrap();
    let yaml = std::fs::read_to_string(&index_path).unwrap();
    assert!(yaml.contains("\nView Analysis:\n---"));
}

#[tokio::test]
async fn test_engine_label_comes_from_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = shop_snapshot().with_engine("MariaDB");
    let snapshot_path = write_snapshot(dir.path(), &snapshot).await;
    let loaded = load_snapshot(&snapshot_path).await.unwrap();
    assert_eq!(loaded.engine, "MariaDB");

    let output = dir.path().join("schema.md");
    write_document(&loaded, &RenderOptions::new(&output))
        .await
        .unwrap();
    let document = std::fs::read_to_string(&output).unwrap();
    assert!(document.contains("## MariaDB Table Schema for Database: shop\n"));

    let options = RenderOptions {
        engine: Some("Percona".to_string()),
        ..RenderOptions::new(&output)
    };
    write_document(&loaded, &options).await.unwrap();
    let document = std::fs::read_to_string(&output).unwrap();
    assert!(document.contains("## Percona Table Schema for Database: shop\n"));
    assert!(!document.contains("MariaDB"));
}

#[tokio::test]
async fn test_missing_view_analysis_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schema.md");

    let options = RenderOptions {
        view_analysis: Some(dir.path().join("absent.md")),
        ..RenderOptions::new(&output)
    };
    let stats = write_document(&shop_snapshot(), &options).await.unwrap();
    assert!(!stats.external_appended);
}

#[tokio::test]
async fn test_index_regeneration_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schema.md");
    write_document(&shop_snapshot(), &RenderOptions::new(&output))
        .await
        .unwrap();

    for format in [IndexFormat::Yaml, IndexFormat::Json] {
        let first = dir.path().join(format!("first.{}", format.extension()));
        let second = dir.path().join(format!("second.{}", format.extension()));
        write_index(&output, &first, format, "MySQL", "shop")
            .await
            .unwrap();
        write_index(&output, &second, format, "MySQL", "shop")
            .await
            .unwrap();
        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }
}

#[tokio::test]
async fn test_json_index_maps_sections_to_spans() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schema.md");
    std::fs::write(
        &output,
        "# Title\n## Users\n<details>\n<summary>Columns</summary>\n\n</details>\n",
    )
    .unwrap();

    let index_path = dir.path().join("schema.json");
    write_index(&output, &index_path, IndexFormat::Json, "MySQL", "shop")
        .await
        .unwrap();

    let json = std::fs::read_to_string(&index_path).unwrap();
    let compact: String = json.chars().filter(|c| !c.is_whitespace()).collect();
    assert_eq!(compact, r#"{"Users":{"Columns":[3,6]}}"#);
}

#[tokio::test]
async fn test_malformed_document_writes_no_index() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("broken.md");
    std::fs::write(&output, "## Users\n<details>\n<summary>Columns</summary>\n").unwrap();
    let index_path = dir.path().join("broken.yml");

    let error = write_index(&output, &index_path, IndexFormat::Yaml, "MySQL", "shop")
        .await
        .unwrap_err();
    assert!(matches!(error, ScribeError::Index(_)));
    assert!(error.to_string().contains("line 2"));
    assert!(!index_path.exists());
}

#[tokio::test]
async fn test_load_snapshot_rejects_unknown_version() {
    let dir = tempfile::tempdir().unwrap();
    let mut snapshot = shop_snapshot();
    snapshot.format_version = "9.9".to_string();
    let path = write_snapshot(dir.path(), &snapshot).await;

    let error = load_snapshot(&path).await.unwrap_err();
    assert!(error.to_string().contains("9.9"));
}

#[tokio::test]
async fn test_load_snapshot_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let error = load_snapshot(&dir.path().join("nope.json")).await.unwrap_err();
    assert!(matches!(error, ScribeError::Io { .. }));
}
