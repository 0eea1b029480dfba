//! In-memory implementation of SessionStore.
//!
//! Each primitive runs under a single write or read lock, so every
//! conditional write is atomic. Backs the `memory` storage backend and the
//! concurrency tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{
    BookingRecord, SessionRecord, SessionStore, StoreError, StoredItem, VersionBump,
};

#[derive(Debug, Default, Clone)]
struct Partition {
    metadata: Option<SessionRecord>,
    bookings: BTreeMap<String, BookingRecord>,
}

/// In-memory session store keyed by partition.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    partitions: RwLock<BTreeMap<String, Partition>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, metadata and bookings alike.
    pub async fn item_count(&self) -> usize {
        self.partitions
            .read()
            .await
            .values()
            .map(|p| usize::from(p.metadata.is_some()) + p.bookings.len())
            .sum()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn query_partition(&self, pk: &str) -> Result<Vec<StoredItem>, StoreError> {
        let partitions = self.partitions.read().await;
        let Some(partition) = partitions.get(pk) else {
            return Ok(Vec::new());
        };

        let mut items = Vec::with_capacity(partition.bookings.len() + 1);
        if let Some(metadata) = &partition.metadata {
            items.push(StoredItem::Session(metadata.clone()));
        }
        items.extend(partition.bookings.values().cloned().map(StoredItem::Booking));
        Ok(items)
    }

    async fn query_category_index(&self, index_pk: &str) -> Result<Vec<SessionRecord>, StoreError> {
        let partitions = self.partitions.read().await;
        let mut records: Vec<SessionRecord> = partitions
            .values()
            .filter_map(|p| p.metadata.as_ref())
            .filter(|record| record.index_pk == index_pk)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.index_sk.cmp(&b.index_sk));
        Ok(records)
    }

    async fn insert_session_if_absent(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(record.pk.clone()).or_default();
        if partition.metadata.is_some() {
            return Err(StoreError::ConditionFailed);
        }
        partition.metadata = Some(record.clone());
        Ok(())
    }

    async fn update_session_if_version(&self, pk: &str, bump: &VersionBump) -> Result<(), StoreError> {
        let mut partitions = self.partitions.write().await;
        let metadata = partitions
            .get_mut(pk)
            .and_then(|p| p.metadata.as_mut())
            .filter(|record| record.version == bump.expected_version)
            .ok_or(StoreError::ConditionFailed)?;

        metadata.version = bump.new_version;
        metadata.booking_count = bump.booking_count;
        metadata.updated_at = bump.updated_at.clone();
        Ok(())
    }

    async fn put_booking_if_absent(&self, record: &BookingRecord) -> Result<(), StoreError> {
        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(record.pk.clone()).or_default();
        if partition.bookings.contains_key(&record.sk) {
            return Err(StoreError::ConditionFailed);
        }
        partition.bookings.insert(record.sk.clone(), record.clone());
        Ok(())
    }
}
