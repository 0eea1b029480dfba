//! Session store port.
//!
//! A key-value store with a secondary index. Each session occupies one
//! partition keyed by its identity string: a metadata record under the sort
//! key [`METADATA_SK`] plus one booking record per participant email.
//!
//! # Atomicity
//!
//! Every method is a single atomic store operation. There are no cross-record
//! transactions; the conditional methods are the only serialization points.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sort key of the metadata record in a session partition.
pub const METADATA_SK: &str = "METADATA";

/// Flat metadata record for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Session identity string.
    pub pk: String,
    /// Category index key, e.g. `CATEGORY#SALSA#1`.
    pub index_pk: String,
    /// Category index sort key, e.g. `2024-12-09#MON#1830`.
    pub index_sk: String,
    pub category: String,
    pub level: Option<u8>,
    pub date: String,
    pub weekday: String,
    /// `HH:mm` clock form.
    pub start_time: String,
    pub max_spots: u32,
    pub booking_count: u32,
    pub version: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// Flat record for one booking. `sk` is the participant email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub pk: String,
    pub sk: String,
    pub booked_at: String,
}

/// Anything stored under a session partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredItem {
    Session(SessionRecord),
    Booking(BookingRecord),
}

impl StoredItem {
    pub fn sort_key(&self) -> &str {
        match self {
            StoredItem::Session(_) => METADATA_SK,
            StoredItem::Booking(record) => &record.sk,
        }
    }
}

/// Compare-and-swap update of a metadata record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionBump {
    /// The update applies only if the stored version equals this.
    pub expected_version: u64,
    pub new_version: u64,
    pub booking_count: u32,
    pub updated_at: String,
}

/// Store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A conditional write's condition did not hold.
    #[error("Conditional check failed")]
    ConditionFailed,

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt item: {0}")]
    Corrupt(String),
}

/// Port for the session key-value store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Every record under a primary key, metadata first.
    ///
    /// Returns an empty vector if the partition does not exist.
    async fn query_partition(&self, pk: &str) -> Result<Vec<StoredItem>, StoreError>;

    /// Metadata records carrying the given category index key.
    async fn query_category_index(&self, index_pk: &str) -> Result<Vec<SessionRecord>, StoreError>;

    /// Insert a metadata record.
    ///
    /// # Errors
    ///
    /// - `ConditionFailed` if a metadata record already exists under `record.pk`
    async fn insert_session_if_absent(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Update version, count and `updated_at` of a metadata record.
    ///
    /// # Errors
    ///
    /// - `ConditionFailed` if the record is missing or its version differs
    ///   from `bump.expected_version`
    async fn update_session_if_version(&self, pk: &str, bump: &VersionBump) -> Result<(), StoreError>;

    /// Insert a booking record.
    ///
    /// # Errors
    ///
    /// - `ConditionFailed` if a record already exists at `(record.pk, record.sk)`
    async fn put_booking_if_absent(&self, record: &BookingRecord) -> Result<(), StoreError>;
}
