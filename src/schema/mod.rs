//! Declarative table definitions.
//!
//! A table is an ordered list of column specs. Primary-key columns are marked
//! on the column itself; the key order is the declaration order.

mod events;

use std::collections::HashSet;

use sea_query::{
    Alias, ColumnDef, Index, PostgresQueryBuilder, SqliteQueryBuilder, Table, TableCreateStatement,
};

use crate::error::SchemaError;
use crate::storage::Dialect;

pub use events::{events_table, EVENTS_TABLE, EVENT_COLUMNS};

/// Logical column type, mapped to a concrete type per dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit signed integer.
    BigInt,
    /// Unbounded string.
    String,
    /// Timestamp without time zone.
    DateTime,
}

/// A single column in a table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub primary_key: bool,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            primary_key: false,
        }
    }

    /// Mark the column as part of the primary key.
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    fn column_def(&self) -> ColumnDef {
        let mut def = ColumnDef::new(Alias::new(self.name));
        match self.column_type {
            ColumnType::BigInt => def.big_integer(),
            ColumnType::String => def.text(),
            ColumnType::DateTime => def.date_time(),
        };
        if self.primary_key {
            def.not_null();
        }
        def
    }
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    pub fn new(name: impl Into<String>, columns: impl Into<Vec<ColumnSpec>>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into(),
        }
    }

    /// Primary-key column names in declaration order.
    pub fn primary_key(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name)
            .collect()
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Check the definition is well formed.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let invalid = |reason: &str| SchemaError::InvalidDefinition {
            table: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("table name is empty"));
        }
        if self.columns.is_empty() {
            return Err(invalid("no columns"));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name) {
                return Err(invalid(&format!("duplicate column {}", column.name)));
            }
        }

        if self.primary_key().is_empty() {
            return Err(invalid("no primary key columns"));
        }
        Ok(())
    }

    /// Build the `CREATE TABLE IF NOT EXISTS` statement.
    pub fn create_statement(&self) -> TableCreateStatement {
        let mut stmt = Table::create();
        stmt.table(Alias::new(self.name.as_str())).if_not_exists();

        for column in &self.columns {
            stmt.col(&mut column.column_def());
        }

        let mut pk = Index::create();
        for name in self.primary_key() {
            pk.col(Alias::new(name));
        }
        stmt.primary_key(&mut pk);

        stmt
    }

    /// Render the create statement as SQL for the given dialect.
    pub fn create_sql(&self, dialect: Dialect) -> String {
        let stmt = self.create_statement();
        match dialect {
            Dialect::Postgres => stmt.to_string(PostgresQueryBuilder),
            Dialect::Sqlite => stmt.to_string(SqliteQueryBuilder),
        }
    }
}
