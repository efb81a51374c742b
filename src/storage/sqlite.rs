//! SQLite storage implementation

use rusqlite::{Connection, params, OptionalExtension};
use crate::{Result, Error};
use crate::parcel::{self, Parcel, ParcelStatus};

const SELECT_PARCEL: &str = "SELECT number, client, status, address, created_at FROM parcels";

/// SQLite-backed store for parcel records.
///
/// The store borrows its connection: whoever opened it also closes it. There
/// is no cache, every read goes to the database.
pub struct ParcelStore<'c> {
    conn: &'c Connection,
}

impl<'c> ParcelStore<'c> {
    /// Wrap an open connection whose schema is already initialized
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert a new parcel and return its assigned number.
    ///
    /// The incoming `number` and `status` are ignored: every new parcel
    /// starts out registered.
    pub fn add(&self, parcel: &Parcel) -> Result<i64> {
        parcel.validate()?;

        self.conn.execute(
            r#"
            INSERT INTO parcels (client, status, address, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                parcel.client,
                ParcelStatus::Registered.as_str(),
                parcel.address,
                parcel.created_at,
            ],
        )?;
        let number = self.conn.last_insert_rowid();
        tracing::debug!(number, client = parcel.client, "Added parcel");
        Ok(number)
    }

    /// Get a parcel by number
    pub fn get(&self, number: i64) -> Result<Parcel> {
        self.conn
            .query_row(
                &format!("{} WHERE number = ?1", SELECT_PARCEL),
                [number],
                row_to_parcel,
            )
            .optional()?
            .ok_or(Error::NotFound(number))
    }

    /// Delete a parcel. Deleting a number that does not exist is not an error.
    pub fn delete(&self, number: i64) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM parcels WHERE number = ?1", [number])?;
        tracing::debug!(number, removed, "Deleted parcel");
        Ok(())
    }

    /// Delete a parcel only while it is still registered.
    ///
    /// Unlike [`ParcelStore::delete`], a missing parcel is reported as
    /// `NotFound` and a dispatched one as `InvalidState`.
    pub fn delete_registered(&self, number: i64) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM parcels WHERE number = ?1 AND status = ?2",
            params![number, ParcelStatus::Registered.as_str()],
        )?;
        if removed == 0 {
            return Err(self.not_registered(number)?);
        }
        tracing::debug!(number, "Deleted registered parcel");
        Ok(())
    }

    /// Change the delivery address of a parcel that has not been sent yet
    pub fn set_address(&self, number: i64, address: &str) -> Result<()> {
        parcel::validate_address(address)?;

        // the status guard lives in the statement, so it holds without a transaction
        let updated = self.conn.execute(
            "UPDATE parcels SET address = ?1 WHERE number = ?2 AND status = ?3",
            params![address, number, ParcelStatus::Registered.as_str()],
        )?;
        if updated == 0 {
            return Err(self.not_registered(number)?);
        }

        tracing::debug!(number, "Updated parcel address");
        Ok(())
    }

    /// Overwrite the status of a parcel. No transition order is enforced here.
    pub fn set_status(&self, number: i64, status: ParcelStatus) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE parcels SET status = ?1 WHERE number = ?2",
            params![status.as_str(), number],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(number));
        }
        tracing::debug!(number, %status, "Updated parcel status");
        Ok(())
    }

    /// Find all parcels belonging to a client, ordered by number
    pub fn get_by_client(&self, client: i64) -> Result<Vec<Parcel>> {
        let mut stmt = self.conn.prepare(
            &format!("{} WHERE client = ?1 ORDER BY number", SELECT_PARCEL)
        )?;

        let parcels = stmt
            .query_map([client], row_to_parcel)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(parcels)
    }

    /// Explain why a registered-only statement touched no row
    fn not_registered(&self, number: i64) -> Result<Error> {
        let status = self
            .conn
            .query_row(
                "SELECT status FROM parcels WHERE number = ?1",
                [number],
                |row| status_column(row, 0),
            )
            .optional()?;
        Ok(match status {
            Some(status) => Error::InvalidState { number, status },
            None => Error::NotFound(number),
        })
    }

    /// Count all parcels
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM parcels", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Helper to convert a row to a Parcel
fn row_to_parcel(row: &rusqlite::Row) -> rusqlite::Result<Parcel> {
    Ok(Parcel {
        number: row.get(0)?,
        client: row.get(1)?,
        status: status_column(row, 2)?,
        address: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn status_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<ParcelStatus> {
    let text: String = row.get(idx)?;
    text.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema;
    use std::collections::HashMap;
    use std::collections::HashSet;

    fn test_parcel() -> Parcel {
        Parcel::new(1000, "test", "2024-01-01T00:00:00Z")
    }

    #[test]
    fn test_add_get_delete() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);
        let mut parcel = test_parcel();

        let number = store.add(&parcel).unwrap();
        assert_ne!(number, 0);
        parcel.number = number;

        let stored = store.get(number).unwrap();
        assert_eq!(stored, parcel);

        store.delete(number).unwrap();
        assert!(matches!(store.get(number), Err(Error::NotFound(n)) if n == number));
    }

    #[test]
    fn test_add_forces_registered() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);

        let mut parcel = test_parcel();
        parcel.status = ParcelStatus::Delivered;
        parcel.number = 42_000;

        let number = store.add(&parcel).unwrap();
        let stored = store.get(number).unwrap();
        assert_eq!(stored.status, ParcelStatus::Registered);
        assert_eq!(stored.created_at, "2024-01-01T00:00:00Z");
        assert_eq!(stored.number, number);
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);

        let empty_address = Parcel::new(1000, "", "2024-01-01T00:00:00Z");
        assert!(matches!(store.add(&empty_address), Err(Error::Validation(_))));

        let bad_time = Parcel::new(1000, "test", "01.01.2024");
        assert!(matches!(store.add(&bad_time), Err(Error::Validation(_))));

        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_numbers_are_unique() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);

        let mut seen = HashSet::new();
        for _ in 0..20 {
            let number = store.add(&test_parcel()).unwrap();
            assert_ne!(number, 0);
            assert!(seen.insert(number));
        }
    }

    #[test]
    fn test_numbers_not_reused_after_delete() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);

        let first = store.add(&test_parcel()).unwrap();
        store.delete(first).unwrap();
        let second = store.add(&test_parcel()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);

        store.delete(12345).unwrap();

        let number = store.add(&test_parcel()).unwrap();
        store.delete(number).unwrap();
        store.delete(number).unwrap();
    }

    #[test]
    fn test_set_address() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);
        let number = store.add(&test_parcel()).unwrap();
        let before = store.get(number).unwrap();

        store.set_address(number, "new test address").unwrap();

        let after = store.get(number).unwrap();
        assert_eq!(after.address, "new test address");
        assert_eq!(after.client, before.client);
        assert_eq!(after.status, before.status);
        assert_eq!(after.created_at, before.created_at);
    }

    #[test]
    fn test_set_address_rejected_after_dispatch() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);
        let number = store.add(&test_parcel()).unwrap();
        store.set_status(number, ParcelStatus::Sent).unwrap();

        let err = store.set_address(number, "too late").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState { number: n, status: ParcelStatus::Sent } if n == number
        ));
        assert_eq!(store.get(number).unwrap().address, "test");
    }

    #[test]
    fn test_set_address_errors() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);

        assert!(matches!(store.set_address(999, "nowhere"), Err(Error::NotFound(999))));

        let number = store.add(&test_parcel()).unwrap();
        assert!(matches!(store.set_address(number, "   "), Err(Error::Validation(_))));
        assert_eq!(store.get(number).unwrap().address, "test");
    }

    #[test]
    fn test_set_address_inside_caller_transaction() {
        let mut conn = schema::open_in_memory().unwrap();
        let tx = conn.transaction().unwrap();
        let store = ParcelStore::new(&tx);

        let number = store.add(&test_parcel()).unwrap();
        store.set_address(number, "b").unwrap();
        assert_eq!(store.get(number).unwrap().address, "b");

        store.set_status(number, ParcelStatus::Sent).unwrap();
        assert!(matches!(store.set_address(number, "c"), Err(Error::InvalidState { .. })));
        tx.commit().unwrap();

        let store = ParcelStore::new(&conn);
        assert_eq!(store.get(number).unwrap().address, "b");
    }

    #[test]
    fn test_delete_registered() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);

        let registered = store.add(&test_parcel()).unwrap();
        store.delete_registered(registered).unwrap();
        assert!(matches!(store.get(registered), Err(Error::NotFound(_))));
        assert!(matches!(store.delete_registered(registered), Err(Error::NotFound(n)) if n == registered));

        let sent = store.add(&test_parcel()).unwrap();
        store.set_status(sent, ParcelStatus::Sent).unwrap();
        assert!(matches!(
            store.delete_registered(sent),
            Err(Error::InvalidState { status: ParcelStatus::Sent, .. })
        ));
        assert!(store.get(sent).is_ok());
    }

    #[test]
    fn test_set_status() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);
        let number = store.add(&test_parcel()).unwrap();
        let before = store.get(number).unwrap();

        store.set_status(number, ParcelStatus::Sent).unwrap();

        let after = store.get(number).unwrap();
        assert_eq!(after.status, ParcelStatus::Sent);
        assert_eq!(after.address, before.address);
        assert_eq!(after.client, before.client);
        assert_eq!(after.created_at, before.created_at);

        // overwrite is unconditional, even backwards
        store.set_status(number, ParcelStatus::Registered).unwrap();
        assert_eq!(store.get(number).unwrap().status, ParcelStatus::Registered);
    }

    #[test]
    fn test_set_status_missing() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);
        assert!(matches!(
            store.set_status(7, ParcelStatus::Delivered),
            Err(Error::NotFound(7))
        ));
    }

    #[test]
    fn test_get_by_client() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);

        let client = 5_000_123;
        let mut inserted = HashMap::new();
        for address in ["first", "second", "third"] {
            let mut parcel = Parcel::new(client, address, "2024-01-01T00:00:00Z");
            parcel.number = store.add(&parcel).unwrap();
            inserted.insert(parcel.number, parcel);
        }
        for other in [1, 2] {
            store.add(&Parcel::new(other, "elsewhere", "2024-01-01T00:00:00Z")).unwrap();
        }

        let found = store.get_by_client(client).unwrap();
        assert_eq!(found.len(), inserted.len());
        for parcel in found {
            assert_eq!(inserted.get(&parcel.number), Some(&parcel));
        }
    }

    #[test]
    fn test_get_by_client_empty() {
        let conn = schema::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);
        store.add(&test_parcel()).unwrap();

        assert!(store.get_by_client(1).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_status_in_database_is_error() {
        let conn = schema::open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO parcels (client, status, address, created_at) VALUES (1, 'lost', 'x', '2024-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        let number = conn.last_insert_rowid();
        let store = ParcelStore::new(&conn);

        assert!(matches!(store.get(number), Err(Error::Persistence(_))));
        assert!(matches!(store.get_by_client(1), Err(Error::Persistence(_))));
    }

    #[test]
    fn test_missing_table_is_persistence_error() {
        let conn = Connection::open_in_memory().unwrap();
        let store = ParcelStore::new(&conn);
        assert!(matches!(store.add(&test_parcel()), Err(Error::Persistence(_))));
        assert!(matches!(store.get(1), Err(Error::Persistence(_))));
    }

    #[test]
    fn test_shared_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.db");

        let writer_conn = schema::open(&path).unwrap();
        let reader_conn = schema::open(&path).unwrap();
        let writer = ParcelStore::new(&writer_conn);
        let reader = ParcelStore::new(&reader_conn);

        let number = writer.add(&test_parcel()).unwrap();
        assert_eq!(reader.get(number).unwrap().address, "test");

        writer.set_status(number, ParcelStatus::Sent).unwrap();
        assert_eq!(reader.get(number).unwrap().status, ParcelStatus::Sent);
    }

    #[test]
    fn test_concurrent_writers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.db");
        drop(schema::open(&path).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let conn = schema::open(&path).unwrap();
                    let store = ParcelStore::new(&conn);
                    (0..10)
                        .map(|_| store.add(&Parcel::new(worker, "addr", "2024-01-01T00:00:00Z")).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut numbers = HashSet::new();
        for handle in handles {
            for number in handle.join().unwrap() {
                assert!(numbers.insert(number));
            }
        }
        assert_eq!(numbers.len(), 40);

        let conn = schema::open(&path).unwrap();
        let store = ParcelStore::new(&conn);
        assert_eq!(store.count().unwrap(), 40);
        assert_eq!(store.get_by_client(2).unwrap().len(), 10);
    }
}
