//! Parcel service - lifecycle rules on top of the store
//!
//! The store performs plain overwrites. The service is where the tracker's
//! business rules live:
//! - new parcels are stamped with the current UTC time
//! - status only moves forward, one step at a time
//! - only registered parcels may be re-addressed or deleted

use crate::{Error, Result};
use crate::parcel::{Parcel, ParcelStatus};
use crate::storage::ParcelStore;

pub struct ParcelService<'s, 'c> {
    store: &'s ParcelStore<'c>,
}

impl<'s, 'c> ParcelService<'s, 'c> {
    pub fn new(store: &'s ParcelStore<'c>) -> Self {
        Self { store }
    }

    /// Register a new parcel for a client and return it with its number
    pub fn register(&self, client: i64, address: &str) -> Result<Parcel> {
        let mut parcel = Parcel::registered_now(client, address);
        parcel.number = self.store.add(&parcel)?;
        tracing::info!(number = parcel.number, client, "Registered parcel");
        Ok(parcel)
    }

    /// Look up a single parcel
    pub fn parcel(&self, number: i64) -> Result<Parcel> {
        self.store.get(number)
    }

    /// All parcels of a client
    pub fn client_parcels(&self, client: i64) -> Result<Vec<Parcel>> {
        self.store.get_by_client(client)
    }

    /// Move a parcel to the next lifecycle stage and return the new status
    pub fn next_status(&self, number: i64) -> Result<ParcelStatus> {
        let parcel = self.store.get(number)?;
        let Some(next) = parcel.status.next() else {
            tracing::warn!(number, "Parcel already delivered");
            return Err(Error::InvalidState { number, status: parcel.status });
        };

        self.store.set_status(number, next)?;
        tracing::info!(number, from = %parcel.status, to = %next, "Advanced parcel status");
        Ok(next)
    }

    /// Change the address of a parcel that has not been sent yet
    pub fn change_address(&self, number: i64, address: &str) -> Result<()> {
        self.store.set_address(number, address)?;
        tracing::info!(number, "Changed parcel address");
        Ok(())
    }

    /// Delete a parcel that has not been sent yet
    pub fn delete(&self, number: i64) -> Result<()> {
        if let Err(e) = self.store.delete_registered(number) {
            if let Error::InvalidState { status, .. } = &e {
                tracing::warn!(number, %status, "Refusing to delete dispatched parcel");
            }
            return Err(e);
        }
        tracing::info!(number, "Deleted parcel");
        Ok(())
    }
}
