//! Database backends for schema definition.
//!
//! The dialect is chosen at runtime from the connection URI scheme. Each
//! dialect is compiled in behind its own cargo feature.

use async_trait::async_trait;
use tracing::info;

use crate::error::{ConnectionError, SchemaError};
use crate::schema::{ColumnType, TableSpec};

pub mod mock;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub use postgres::PostgresSchemaStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSchemaStore;

/// SQL dialect of the target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Detect the dialect from a connection URI.
    ///
    /// Accepts `postgres://`, `postgresql://` and `sqlite:` URIs. A `+driver`
    /// suffix on the scheme (`postgresql+psycopg2://`) is ignored.
    pub fn from_uri(uri: &str) -> Result<Self, ConnectionError> {
        let Some((scheme, _)) = uri.split_once(':') else {
            return Err(ConnectionError::UnsupportedDialect(
                "missing URI scheme".to_string(),
            ));
        };

        let base = scheme.split('+').next().unwrap_or(scheme);
        match base.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" => Ok(Dialect::Sqlite),
            _ => Err(ConnectionError::UnsupportedDialect(scheme.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Whether a catalog-reported type name fits the logical column type.
    ///
    /// PostgreSQL reports canonical names; SQLite only has type affinity, so
    /// declared names are matched by affinity rules.
    pub fn matches_type(&self, column_type: ColumnType, reported: &str) -> bool {
        let reported = reported.to_ascii_lowercase();
        match self {
            Dialect::Postgres => match column_type {
                ColumnType::BigInt => reported == "bigint",
                ColumnType::String => reported == "text" || reported == "character varying",
                ColumnType::DateTime => reported == "timestamp without time zone",
            },
            Dialect::Sqlite => match column_type {
                ColumnType::BigInt => reported.contains("int"),
                ColumnType::String => ["char", "clob", "text"]
                    .iter()
                    .any(|t| reported.contains(t)),
                // No native timestamp type; stored as text or number.
                ColumnType::DateTime => true,
            },
        }
    }

    /// Rewrite the URI into the form sqlx expects.
    ///
    /// SQLite URIs in the `sqlite:///relative.db` / `sqlite:////abs.db` form
    /// are mapped to sqlx's `sqlite:relative.db` / `sqlite:/abs.db`. A bare
    /// `sqlite://` is an in-memory database.
    pub fn normalize_uri(&self, uri: &str) -> String {
        let rest = uri.split_once(':').map(|(_, rest)| rest).unwrap_or(uri);
        match self {
            Dialect::Postgres => format!("postgres:{}", rest),
            Dialect::Sqlite => match rest.strip_prefix("///") {
                Some("") => "sqlite::memory:".to_string(),
                Some(path) => format!("sqlite:{}", path),
                None if rest == "//" => "sqlite::memory:".to_string(),
                None => format!("sqlite:{}", rest),
            },
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A column as reported by the database catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Dialect-specific type name, e.g. `bigint` or `timestamp without time zone`.
    pub data_type: String,
}

/// An existing table as reported by the database catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    /// Primary-key column names in key order.
    pub primary_key: Vec<String>,
}

impl TableInfo {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Catalog access and DDL execution for one database.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Check whether a table with this name exists.
    async fn table_exists(&self, name: &str) -> Result<bool, SchemaError>;

    /// Create the table if it does not exist.
    async fn create_table(&self, table: &TableSpec) -> Result<(), SchemaError>;

    /// Read an existing table's columns and primary key.
    ///
    /// Returns `None` if the table does not exist.
    async fn describe_table(&self, name: &str) -> Result<Option<TableInfo>, SchemaError>;

    /// Release the underlying connection.
    async fn close(&self);
}

/// Connect to the database named by the URI.
///
/// Opens a single connection; the returned store holds it until
/// [`SchemaStore::close`].
pub async fn connect(uri: &str) -> Result<Box<dyn SchemaStore>, ConnectionError> {
    let dialect = Dialect::from_uri(uri)?;
    info!(dialect = %dialect, "Connecting to database");

    let uri = dialect.normalize_uri(uri);
    match dialect {
        Dialect::Postgres => connect_postgres(&uri).await,
        Dialect::Sqlite => connect_sqlite(&uri).await,
    }
}

#[cfg(feature = "postgres")]
async fn connect_postgres(uri: &str) -> Result<Box<dyn SchemaStore>, ConnectionError> {
    let store = PostgresSchemaStore::connect(uri).await?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn connect_postgres(_uri: &str) -> Result<Box<dyn SchemaStore>, ConnectionError> {
    Err(ConnectionError::DialectDisabled {
        dialect: "PostgreSQL",
        feature: "postgres",
    })
}

#[cfg(feature = "sqlite")]
async fn connect_sqlite(uri: &str) -> Result<Box<dyn SchemaStore>, ConnectionError> {
    let store = SqliteSchemaStore::connect(uri).await?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "sqlite"))]
async fn connect_sqlite(_uri: &str) -> Result<Box<dyn SchemaStore>, ConnectionError> {
    Err(ConnectionError::DialectDisabled {
        dialect: "SQLite",
        feature: "sqlite",
    })
}
