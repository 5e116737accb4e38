use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, InMemoryCacheStore, MemoryEntry};

const CACHE_PREFIX: &str = "cache";

impl InMemoryCacheStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory generic cache store");
        Self {
            entry: HashMap::new(),
        }
    }

    fn make_key(prefix: &str, key: &str) -> String {
        format!("{CACHE_PREFIX}:{prefix}:{key}")
    }

    fn insert(&mut self, prefix: &str, key: &str, value: CacheData, expires_at: Option<Instant>) {
        let now = Instant::now();
        let before = self.entry.len();
        self.entry.retain(|_, entry| !entry.is_expired(now));
        let pruned = before - self.entry.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned expired cache entries");
        }
        self.entry
            .insert(Self::make_key(prefix, key), MemoryEntry { value, expires_at });
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn put(&mut self, prefix: &str, key: &str, value: CacheData) -> Result<(), StorageError> {
        self.insert(prefix, key, value, None);
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError> {
        let expires_at = Instant::now().checked_add(Duration::from_secs(ttl as u64));
        self.insert(prefix, key, value, expires_at);
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        Ok(self
            .entry
            .get(&Self::make_key(prefix, key))
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.value.clone()))
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        self.entry.remove(&Self::make_key(prefix, key));
        Ok(())
    }
}
