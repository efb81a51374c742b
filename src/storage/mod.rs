//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with a single table:
//! - parcels(number, client, status, address, created_at)
//!
//! Connections are opened by the caller and lent to the store.

pub mod schema;
pub mod sqlite;

pub use schema::{initialize, open, open_in_memory};
pub use sqlite::ParcelStore;
