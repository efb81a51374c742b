//! Database schema definitions

use std::path::Path;
use std::time::Duration;
use rusqlite::Connection;
use crate::Result;

/// SQL to create the parcels table
///
/// AUTOINCREMENT keeps numbers of deleted parcels from being handed out again.
pub const CREATE_PARCELS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS parcels (
    number INTEGER PRIMARY KEY AUTOINCREMENT,
    client INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'registered',
    address TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_parcels_client ON parcels(client)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_PARCELS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Create the schema on an existing connection (no-op if already present)
pub fn initialize(conn: &Connection) -> Result<()> {
    for stmt in all_schema_statements() {
        conn.execute(stmt, [])?;
    }
    Ok(())
}

/// Open a database file with the schema in place.
///
/// Missing parent directories and the file itself are created.
pub fn open(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    // other processes may hold the write lock briefly
    conn.busy_timeout(Duration::from_secs(5))?;
    initialize(&conn)?;
    tracing::debug!("Opened parcel database at {}", path.display());
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    initialize(&conn)?;
    Ok(conn)
}
