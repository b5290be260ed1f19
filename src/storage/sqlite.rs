//! SQLite implementation of SchemaStore.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::{ColumnInfo, Dialect, SchemaStore, TableInfo};
use crate::error::{ConnectionError, SchemaError};
use crate::schema::TableSpec;

const TABLE_EXISTS_SQL: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1";

const TABLE_INFO_SQL: &str = "SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid";

/// SQLite-backed schema store.
pub struct SqliteSchemaStore {
    pool: SqlitePool,
}

impl SqliteSchemaStore {
    /// Create a new SQLite schema store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a single-connection pool to the given URI.
    ///
    /// The database file is created if missing; its directory must exist.
    pub async fn connect(uri: &str) -> Result<Self, ConnectionError> {
        let options = SqliteConnectOptions::from_str(uri)
            .map_err(ConnectionError::InvalidUri)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|source| ConnectionError::Connect {
                dialect: "SQLite",
                source,
            })?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SchemaStore for SqliteSchemaStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn table_exists(&self, name: &str) -> Result<bool, SchemaError> {
        let count: i64 = sqlx::query_scalar(TABLE_EXISTS_SQL)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn create_table(&self, table: &TableSpec) -> Result<(), SchemaError> {
        let sql = table.create_sql(Dialect::Sqlite);
        debug!(table = %table.name, sql = %sql, "Executing DDL");

        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn describe_table(&self, name: &str) -> Result<Option<TableInfo>, SchemaError> {
        if !self.table_exists(name).await? {
            return Ok(None);
        }

        let rows = sqlx::query(TABLE_INFO_SQL)
            .bind(name)
            .fetch_all(&self.pool)
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        let mut keyed: Vec<(i64, String)> = Vec::new();
        for row in &rows {
            let column_name: String = row.try_get("name")?;
            let data_type: String = row.try_get("type")?;
            // pk is the 1-based position within the primary key, 0 otherwise
            let pk: i64 = row.try_get("pk")?;

            if pk > 0 {
                keyed.push((pk, column_name.clone()));
            }
            columns.push(ColumnInfo {
                name: column_name,
                data_type: data_type.to_ascii_lowercase(),
            });
        }

        keyed.sort_by_key(|(position, _)| *position);
        let primary_key = keyed.into_iter().map(|(_, name)| name).collect();

        Ok(Some(TableInfo {
            name: name.to_string(),
            columns,
            primary_key,
        }))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::events_table;

    async fn scratch_store() -> (tempfile::TempDir, SqliteSchemaStore) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let uri = format!("sqlite:{}", dir.path().join("events.db").display());
        let store = SqliteSchemaStore::connect(&uri)
            .await
            .expect("connect to scratch database");
        (dir, store)
    }

    #[tokio::test]
    async fn test_table_exists_before_and_after_create() {
        let (_dir, store) = scratch_store().await;
        let table = events_table();

        assert!(!store.table_exists("events").await.unwrap());
        store.create_table(&table).await.unwrap();
        assert!(store.table_exists("events").await.unwrap());
    }

    #[tokio::test]
    async fn test_describe_missing_table() {
        let (_dir, store) = scratch_store().await;

        assert!(store.describe_table("events").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_describe_reports_columns_and_key_order() {
        let (_dir, store) = scratch_store().await;
        store.create_table(&events_table()).await.unwrap();

        let info = store
            .describe_table("events")
            .await
            .unwrap()
            .expect("table should exist");

        let names: Vec<&str> = info.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, events_table().column_names());
        assert_eq!(
            info.primary_key,
            vec!["sequence_number", "creation_number", "account_address"]
        );
        assert_eq!(info.column("data").unwrap().data_type, "text");
    }

    #[tokio::test]
    async fn test_connect_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let uri = format!(
            "sqlite:{}",
            dir.path().join("absent").join("events.db").display()
        );

        let err = SqliteSchemaStore::connect(&uri)
            .await
            .err()
            .expect("connect should fail");

        assert!(matches!(err, ConnectionError::Connect { .. }));
    }
}
