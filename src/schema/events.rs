//! The `events` table.
//!
//! One row per on-chain event, keyed by the event stream
//! (`account_address`, `creation_number`) and the position in that stream
//! (`sequence_number`).

use super::{ColumnSpec, ColumnType, TableSpec};

/// Name of the events table.
pub const EVENTS_TABLE: &str = "events";

/// Columns of the events table in declaration order.
pub const EVENT_COLUMNS: [ColumnSpec; 9] = [
    ColumnSpec::new("sequence_number", ColumnType::BigInt).primary_key(),
    ColumnSpec::new("creation_number", ColumnType::BigInt).primary_key(),
    ColumnSpec::new("account_address", ColumnType::String).primary_key(),
    ColumnSpec::new("transaction_version", ColumnType::BigInt),
    ColumnSpec::new("transaction_block_height", ColumnType::BigInt),
    ColumnSpec::new("type", ColumnType::String),
    // Serialized payload, usually JSON.
    ColumnSpec::new("data", ColumnType::String),
    ColumnSpec::new("inserted_at", ColumnType::DateTime),
    ColumnSpec::new("event_index", ColumnType::BigInt),
];

/// Definition of the events table.
pub fn events_table() -> TableSpec {
    TableSpec::new(EVENTS_TABLE, EVENT_COLUMNS)
}
