use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Instant;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

pub struct InMemoryCacheStore {
    pub(super) entry: HashMap<String, MemoryEntry>,
}

/// Cached value with an optional deadline
pub(super) struct MemoryEntry {
    pub(super) value: CacheData,
    pub(super) expires_at: Option<Instant>,
}

impl MemoryEntry {
    pub(super) fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

pub struct RedisCacheStore {
    pub(super) client: redis::Client,
}

/// Keyed store for short-lived per-visitor records
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put a value into the store.
    async fn put(&mut self, prefix: &str, key: &str, value: CacheData)
    -> Result<(), StorageError>;

    /// Put a value into the store with a TTL in seconds.
    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError>;

    /// Get a value from the store.
    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError>;

    /// Remove a value from the store.
    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError>;
}
