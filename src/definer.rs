//! Schema definer.
//!
//! Ensures a table exists with the declared columns and primary key. An
//! existing table is never altered: it is checked against the definition and
//! either accepted as-is or reported as incompatible.

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, SchemaError};
use crate::schema::{events_table, TableSpec};
use crate::storage::{self, Dialect, SchemaStore, TableInfo};

/// What [`ensure_table`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The table was absent and has been created.
    Created,
    /// The table already existed and was left unchanged.
    AlreadyPresent,
}

/// Create the table if it is absent; otherwise verify the existing one.
pub async fn ensure_table(
    store: &dyn SchemaStore,
    table: &TableSpec,
) -> std::result::Result<EnsureOutcome, SchemaError> {
    table.validate()?;

    match store.describe_table(&table.name).await? {
        None => {
            store.create_table(table).await?;
            info!(
                table = %table.name,
                dialect = %store.dialect(),
                columns = table.columns.len(),
                "Table created"
            );
            Ok(EnsureOutcome::Created)
        }
        Some(existing) => {
            check_compatible(store.dialect(), table, &existing)?;
            info!(
                table = %table.name,
                dialect = %store.dialect(),
                "Table already exists, leaving it unchanged"
            );
            Ok(EnsureOutcome::AlreadyPresent)
        }
    }
}

/// Check an existing table against the definition.
///
/// Every declared column must be present and the primary-key column sets must
/// match. Extra columns and differing column types only produce warnings.
pub fn check_compatible(
    dialect: Dialect,
    table: &TableSpec,
    existing: &TableInfo,
) -> std::result::Result<(), SchemaError> {
    let incompatible = |reason: String| SchemaError::Incompatible {
        table: table.name.clone(),
        reason,
    };

    let missing: Vec<&str> = table
        .column_names()
        .into_iter()
        .filter(|name| !existing.has_column(name))
        .collect();
    if !missing.is_empty() {
        return Err(incompatible(format!(
            "missing columns: {}",
            missing.join(", ")
        )));
    }

    let declared_key = table.primary_key();
    let expected: BTreeSet<&str> = declared_key.iter().copied().collect();
    let actual: BTreeSet<&str> = existing.primary_key.iter().map(String::as_str).collect();
    if expected != actual {
        return Err(incompatible(format!(
            "primary key is ({}), expected ({})",
            existing.primary_key.join(", "),
            declared_key.join(", ")
        )));
    }

    for (column, reported) in type_mismatches(dialect, table, existing) {
        warn!(
            table = %table.name,
            column = %column,
            dialect = %dialect,
            reported = %reported,
            "Existing column has a different type"
        );
    }

    let declared = table.column_names();
    let extra: Vec<&str> = existing
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .filter(|name| !declared.iter().any(|d| d == name))
        .collect();
    if !extra.is_empty() {
        warn!(
            table = %table.name,
            extra = %extra.join(", "),
            "Existing table has undeclared columns"
        );
    }

    Ok(())
}

/// Declared columns whose catalog type does not fit the declared type.
pub fn type_mismatches<'a>(
    dialect: Dialect,
    table: &TableSpec,
    existing: &'a TableInfo,
) -> Vec<(&'static str, &'a str)> {
    table
        .columns
        .iter()
        .filter_map(|spec| {
            let info = existing.column(spec.name)?;
            (!dialect.matches_type(spec.column_type, &info.data_type))
                .then_some((spec.name, info.data_type.as_str()))
        })
        .collect()
}

/// Connect using the configured URI and ensure the events table exists.
///
/// The connection is closed before returning, on success or failure.
pub async fn run(config: &Config) -> Result<EnsureOutcome> {
    config.validate()?;

    let store = storage::connect(&config.db_connection_uri).await?;
    let outcome = ensure_table(store.as_ref(), &events_table()).await;
    store.close().await;

    Ok(outcome?)
}
