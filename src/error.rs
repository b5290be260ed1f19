//! Error taxonomy for the schema definer.
//!
//! Three kinds of failure reach the process boundary: the configuration could
//! not be loaded, the database could not be reached, or the table could not be
//! created or is incompatible with the declared schema.

use crate::config::ConfigError;

/// Result type for definer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by [`crate::definer::run`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Failures establishing a database connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("unsupported database dialect: {0}")]
    UnsupportedDialect(String),

    #[error("{dialect} support is not compiled in (enable the `{feature}` feature)")]
    DialectDisabled {
        dialect: &'static str,
        feature: &'static str,
    },

    #[error("invalid connection URI: {0}")]
    InvalidUri(#[source] sqlx::Error),

    #[error("failed to connect to {dialect} database: {source}")]
    Connect {
        dialect: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Failures defining, creating or verifying a table.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid table definition for {table}: {reason}")]
    InvalidDefinition { table: String, reason: String },

    #[error("table {table} exists with an incompatible schema: {reason}")]
    Incompatible { table: String, reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
