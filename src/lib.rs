//! # Tracker - parcel record store
//!
//! Persistence layer for tracking parcels: who sent them, where they go,
//! how far along they are and when they were registered.
//!
//! Tracker provides:
//! - A closed `ParcelStatus` lifecycle (registered, sent, delivered)
//! - `ParcelStore`, a thin CRUD layer over a caller-owned SQLite connection
//! - `ParcelService`, which applies the lifecycle rules on top of the store
//! - A `tracker` command-line front end

pub mod parcel;
pub mod storage;
pub mod service;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use parcel::{Parcel, ParcelStatus};
pub use storage::ParcelStore;
pub use service::ParcelService;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for tracker operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller supplied a malformed value; nothing was sent to storage
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parcel not found: {0}")]
    NotFound(i64),

    /// Operation is not allowed for the parcel's current status
    #[error("Parcel {number} is {status}, operation not allowed")]
    InvalidState { number: i64, status: ParcelStatus },

    #[error("Storage error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
