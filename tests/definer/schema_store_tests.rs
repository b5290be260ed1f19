//! SchemaStore and ensure_table contract tests.
//!
//! Each test works on its own table name so one database can host the whole
//! suite.

use events_schema::schema::{ColumnSpec, ColumnType, TableSpec, EVENT_COLUMNS};
use events_schema::storage::SchemaStore;
use events_schema::{ensure_table, EnsureOutcome, SchemaError};

/// Events definition under a test-specific table name.
pub fn events_like(name: &str) -> TableSpec {
    TableSpec::new(name, EVENT_COLUMNS)
}

// =============================================================================
// Creation
// =============================================================================

pub async fn test_creates_all_columns(store: &dyn SchemaStore) {
    let table = events_like("test_create_columns");

    let outcome = ensure_table(store, &table).await.expect("ensure should succeed");
    assert_eq!(outcome, EnsureOutcome::Created);

    let info = store
        .describe_table(&table.name)
        .await
        .expect("describe should succeed")
        .expect("table should exist");

    let names: Vec<&str> = info.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, table.column_names());
}

pub async fn test_creates_composite_primary_key(store: &dyn SchemaStore) {
    let table = events_like("test_create_pk");

    ensure_table(store, &table).await.expect("ensure should succeed");

    let info = store
        .describe_table(&table.name)
        .await
        .expect("describe should succeed")
        .expect("table should exist");

    let mut key = info.primary_key.clone();
    key.sort();
    assert_eq!(
        key,
        vec!["account_address", "creation_number", "sequence_number"]
    );
}

pub async fn test_reports_missing_table(store: &dyn SchemaStore) {
    let exists = store
        .table_exists("test_never_created")
        .await
        .expect("exists check should succeed");
    assert!(!exists);

    let info = store
        .describe_table("test_never_created")
        .await
        .expect("describe should succeed");
    assert!(info.is_none());
}

// =============================================================================
// Idempotence
// =============================================================================

pub async fn test_second_ensure_is_noop(store: &dyn SchemaStore) {
    let table = events_like("test_idempotent");

    let first = ensure_table(store, &table).await.expect("first ensure");
    let before = store.describe_table(&table.name).await.expect("describe");

    let second = ensure_table(store, &table).await.expect("second ensure");
    let after = store.describe_table(&table.name).await.expect("describe");

    assert_eq!(first, EnsureOutcome::Created);
    assert_eq!(second, EnsureOutcome::AlreadyPresent);
    assert_eq!(before, after, "second ensure must not change the schema");
}

pub async fn test_create_table_twice_succeeds(store: &dyn SchemaStore) {
    let table = events_like("test_create_twice");

    store.create_table(&table).await.expect("first create");
    store
        .create_table(&table)
        .await
        .expect("create should be IF NOT EXISTS");
}

// =============================================================================
// Existing tables with a different shape
// =============================================================================

pub async fn test_incompatible_table_is_rejected(store: &dyn SchemaStore) {
    let name = "test_incompatible";
    let legacy = TableSpec::new(
        name,
        vec![
            ColumnSpec::new("id", ColumnType::BigInt).primary_key(),
            ColumnSpec::new("payload", ColumnType::String),
        ],
    );
    store.create_table(&legacy).await.expect("create legacy table");
    let before = store.describe_table(name).await.expect("describe");

    let err = ensure_table(store, &events_like(name))
        .await
        .expect_err("incompatible table should be rejected");

    assert!(matches!(err, SchemaError::Incompatible { .. }), "{err}");
    let after = store.describe_table(name).await.expect("describe");
    assert_eq!(before, after, "incompatible table must be left unchanged");
}

pub async fn test_different_primary_key_is_rejected(store: &dyn SchemaStore) {
    let name = "test_other_key";
    let rekeyed: Vec<ColumnSpec> = EVENT_COLUMNS
        .iter()
        .map(|c| match c.name {
            "transaction_version" | "event_index" => {
                ColumnSpec::new(c.name, c.column_type).primary_key()
            }
            _ => ColumnSpec::new(c.name, c.column_type),
        })
        .collect();
    store
        .create_table(&TableSpec::new(name, rekeyed))
        .await
        .expect("create rekeyed table");

    let err = ensure_table(store, &events_like(name))
        .await
        .expect_err("different key should be rejected");

    assert!(err.to_string().contains("primary key"), "{err}");
}

pub async fn test_extra_columns_are_tolerated(store: &dyn SchemaStore) {
    let name = "test_extra_columns";
    let mut columns = EVENT_COLUMNS.to_vec();
    columns.push(ColumnSpec::new("indexed_type", ColumnType::String));
    store
        .create_table(&TableSpec::new(name, columns))
        .await
        .expect("create wider table");

    let outcome = ensure_table(store, &events_like(name))
        .await
        .expect("extra columns should be tolerated");

    assert_eq!(outcome, EnsureOutcome::AlreadyPresent);
}

/// Run every contract test against a store.
#[macro_export]
macro_rules! run_schema_store_tests {
    ($store:expr) => {
        use $crate::definer::schema_store_tests::*;

        // creation
        test_creates_all_columns($store).await;
        println!("  test_creates_all_columns: PASSED");

        test_creates_composite_primary_key($store).await;
        println!("  test_creates_composite_primary_key: PASSED");

        test_reports_missing_table($store).await;
        println!("  test_reports_missing_table: PASSED");

        // idempotence
        test_second_ensure_is_noop($store).await;
        println!("  test_second_ensure_is_noop: PASSED");

        test_create_table_twice_succeeds($store).await;
        println!("  test_create_table_twice_succeeds: PASSED");

        // existing tables
        test_incompatible_table_is_rejected($store).await;
        println!("  test_incompatible_table_is_rejected: PASSED");

        test_different_primary_key_is_rejected($store).await;
        println!("  test_different_primary_key_is_rejected: PASSED");

        test_extra_columns_are_tolerated($store).await;
        println!("  test_extra_columns_are_tolerated: PASSED");
    };
}
