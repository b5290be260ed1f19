//! PostgreSQL implementation of SchemaStore.
//!
//! Catalog reads go through `information_schema`, scoped to `current_schema()`
//! so a table of the same name in another schema is not mistaken for ours.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row};
use tracing::debug;

use super::{ColumnInfo, Dialect, SchemaStore, TableInfo};
use crate::error::{ConnectionError, SchemaError};
use crate::schema::TableSpec;

const TABLE_EXISTS_SQL: &str = "SELECT EXISTS (
    SELECT 1 FROM information_schema.tables
    WHERE table_schema = current_schema() AND table_name = $1
)";

const COLUMNS_SQL: &str = "SELECT column_name::text AS column_name, data_type::text AS data_type
    FROM information_schema.columns
    WHERE table_schema = current_schema() AND table_name = $1
    ORDER BY ordinal_position";

const PRIMARY_KEY_SQL: &str = "SELECT kcu.column_name::text AS column_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON tc.constraint_schema = kcu.constraint_schema
     AND tc.constraint_name = kcu.constraint_name
     AND tc.table_name = kcu.table_name
    WHERE tc.constraint_type = 'PRIMARY KEY'
      AND tc.table_schema = current_schema()
      AND tc.table_name = $1
    ORDER BY kcu.ordinal_position";

/// PostgreSQL-backed schema store.
pub struct PostgresSchemaStore {
    pool: PgPool,
}

impl PostgresSchemaStore {
    /// Create a new PostgreSQL schema store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a single-connection pool to the given URI.
    pub async fn connect(uri: &str) -> Result<Self, ConnectionError> {
        let options = PgConnectOptions::from_str(uri).map_err(ConnectionError::InvalidUri)?;

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|source| ConnectionError::Connect {
                dialect: "PostgreSQL",
                source,
            })?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SchemaStore for PostgresSchemaStore {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn table_exists(&self, name: &str) -> Result<bool, SchemaError> {
        let exists: bool = sqlx::query_scalar(TABLE_EXISTS_SQL)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create_table(&self, table: &TableSpec) -> Result<(), SchemaError> {
        let sql = table.create_sql(Dialect::Postgres);
        debug!(table = %table.name, sql = %sql, "Executing DDL");

        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn describe_table(&self, name: &str) -> Result<Option<TableInfo>, SchemaError> {
        if !self.table_exists(name).await? {
            return Ok(None);
        }

        let rows = sqlx::query(COLUMNS_SQL)
            .bind(name)
            .fetch_all(&self.pool)
            .await?;
        let columns = rows
            .iter()
            .map(|r| {
                Ok(ColumnInfo {
                    name: r.try_get("column_name")?,
                    data_type: r.try_get("data_type")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let primary_key: Vec<String> = sqlx::query_scalar(PRIMARY_KEY_SQL)
            .bind(name)
            .fetch_all(&self.pool)
            .await?;

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
