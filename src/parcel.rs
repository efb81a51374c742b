//! Parcel types - one tracked shipment per record
//!
//! Parcels move through a fixed lifecycle:
//! - `Registered`: accepted, not yet dispatched
//! - `Sent`: handed to delivery
//! - `Delivered`: terminal state

use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle stage of a parcel.
///
/// The member list is closed so that unknown values are rejected when text
/// is parsed, before anything reaches storage. Parsing accepts exactly the
/// lowercase names, with no trimming or case folding. Variants are declared
/// in lifecycle order, so `Ord` follows the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParcelStatus {
    /// Accepted by the tracker, address may still change
    Registered,
    /// Dispatched to the carrier
    Sent,
    /// Handed over to the recipient
    Delivered,
}

impl ParcelStatus {
    /// Get the string representation stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            ParcelStatus::Registered => "registered",
            ParcelStatus::Sent => "sent",
            ParcelStatus::Delivered => "delivered",
        }
    }

    /// Get all statuses in lifecycle order
    pub fn all() -> &'static [ParcelStatus] {
        &[
            ParcelStatus::Registered,
            ParcelStatus::Sent,
            ParcelStatus::Delivered,
        ]
    }

    /// The stage that follows this one, `None` once delivered
    pub fn next(&self) -> Option<ParcelStatus> {
        match self {
            ParcelStatus::Registered => Some(ParcelStatus::Sent),
            ParcelStatus::Sent => Some(ParcelStatus::Delivered),
            ParcelStatus::Delivered => None,
        }
    }
}

impl FromStr for ParcelStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "registered" => Ok(ParcelStatus::Registered),
            "sent" => Ok(ParcelStatus::Sent),
            "delivered" => Ok(ParcelStatus::Delivered),
            _ => Err(Error::Validation(format!("Unknown parcel status: {}", s))),
        }
    }
}

impl std::fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parcel record.
///
/// `number` is zero until the store assigns one on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Store-assigned identifier, 0 before creation
    pub number: i64,
    /// Owner of the parcel, opaque to the store
    pub client: i64,
    pub status: ParcelStatus,
    /// Delivery address
    pub address: String,
    /// UTC timestamp in RFC 3339 form, kept verbatim
    pub created_at: String,
}

impl Parcel {
    /// Create an unsaved, registered parcel
    pub fn new(client: i64, address: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: created_at.into(),
        }
    }

    /// Create an unsaved parcel stamped with the current UTC time
    pub fn registered_now(client: i64, address: impl Into<String>) -> Self {
        Self::new(client, address, now_rfc3339())
    }

    /// Check the fields a caller must supply before the parcel is stored
    pub fn validate(&self) -> Result<()> {
        validate_address(&self.address)?;
        validate_timestamp(&self.created_at)
    }

}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn validate_address(address: &str) -> Result<()> {
    if address.trim().is_empty() {
        return Err(Error::Validation("address must not be empty".to_string()));
    }
    Ok(())
}

pub(crate) fn validate_timestamp(created_at: &str) -> Result<()> {
    DateTime::parse_from_rfc3339(created_at)
        .map(|_| ())
        .map_err(|e| Error::Validation(format!("created_at {:?} is not RFC 3339: {}", created_at, e)))
}
