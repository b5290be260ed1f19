//! Mock schema store for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ColumnInfo, Dialect, SchemaStore, TableInfo};
use crate::error::SchemaError;
use crate::schema::{ColumnType, TableSpec};

/// Mock schema store that keeps table definitions in memory.
#[derive(Default)]
pub struct MockSchemaStore {
    tables: RwLock<HashMap<String, TableInfo>>,
    create_calls: RwLock<Vec<String>>,
    fail_on_create: RwLock<bool>,
}

impl MockSchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing table.
    pub async fn insert_table(&self, info: TableInfo) {
        self.tables.write().await.insert(info.name.clone(), info);
    }

    pub async fn set_fail_on_create(&self, fail: bool) {
        *self.fail_on_create.write().await = fail;
    }

    /// Names passed to `create_table`, in call order.
    pub async fn create_calls(&self) -> Vec<String> {
        self.create_calls.read().await.clone()
    }

    pub async fn table(&self, name: &str) -> Option<TableInfo> {
        self.tables.read().await.get(name).cloned()
    }
}

/// Type names as SQLite reports them for tables built by sea-query.
fn sqlite_type_name(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::BigInt => "bigint",
        ColumnType::String => "text",
        ColumnType::DateTime => "datetime_text",
    }
}

#[async_trait]
impl SchemaStore for MockSchemaStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn table_exists(&self, name: &str) -> Result<bool, SchemaError> {
        Ok(self.tables.read().await.contains_key(name))
    }

    async fn create_table(&self, table: &TableSpec) -> Result<(), SchemaError> {
        self.create_calls.write().await.push(table.name.clone());

        if *self.fail_on_create.read().await {
            return Err(SchemaError::Database(sqlx::Error::Protocol(
                "mock create failure".to_string(),
            )));
        }

        let mut tables = self.tables.write().await;
        tables.entry(table.name.clone()).or_insert_with(|| TableInfo {
            name: table.name.clone(),
            columns: table
                .columns
                .iter()
                .map(|c| ColumnInfo {
                    name: c.name.to_string(),
                    data_type: sqlite_type_name(c.column_type).to_string(),
                })
                .collect(),
            primary_key: table.primary_key().iter().map(|n| n.to_string()).collect(),
        });
        Ok(())
    }

    async fn describe_table(&self, name: &str) -> Result<Option<TableInfo>, SchemaError> {
        Ok(self.tables.read().await.get(name).cloned())
    }

    async fn close(&self) {}
}
