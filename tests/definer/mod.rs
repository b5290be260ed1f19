//! Shared schema definer integration tests.
//!
//! Tests the SchemaStore interface and ensure_table against every dialect.
//! Each dialect's test binary imports these functions and runs them.

pub mod schema_store_tests;
