//! Record trait - common interface for all tracked record kinds

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{RecordId, RecordPrefix};

/// Common trait for the four record kinds of the fulfillment chain
pub trait Record: Serialize + DeserializeOwned {
    /// The record type prefix (e.g., "RCPT", "LAB")
    const PREFIX: RecordPrefix;

    /// Get the record's unique ID
    fn id(&self) -> &RecordId;

    /// Get the record's lifecycle status as stored on disk
    fn status(&self) -> String;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated(&self) -> DateTime<Utc>;
}
