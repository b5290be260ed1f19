//! Events schema definer.
//!
//! Creates the blockchain `events` table in a PostgreSQL or SQLite database
//! if it does not already exist. Safe to run repeatedly against the same
//! database.

pub mod config;
pub mod definer;
pub mod error;
pub mod schema;
pub mod storage;
pub mod utils;

pub use config::{Config, ConfigError};
pub use definer::{ensure_table, run, EnsureOutcome};
pub use error::{ConnectionError, Error, SchemaError};
