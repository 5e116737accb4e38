use std::{env, sync::Arc};
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;

use super::types::{CacheStore, InMemoryCacheStore, RedisCacheStore};

/// Cache store shared between request handlers
pub type SharedCacheStore = Arc<Mutex<Box<dyn CacheStore>>>;

/// Build a cache store from `GENERIC_CACHE_STORE_TYPE` and `GENERIC_CACHE_STORE_URL`
///
/// The URL is only required for the "redis" type.
pub async fn cache_store_from_env() -> Result<SharedCacheStore, StorageError> {
    let store_type = env::var("GENERIC_CACHE_STORE_TYPE").unwrap_or_else(|_| "memory".to_string());
    let store_url = env::var("GENERIC_CACHE_STORE_URL").unwrap_or_default();

    connect_cache_store(&store_type, &store_url).await
}

/// Create a cache store of the given type ("memory" or "redis") and verify it is reachable
pub async fn connect_cache_store(
    store_type: &str,
    store_url: &str,
) -> Result<SharedCacheStore, StorageError> {
    tracing::info!("Initializing cache store with type: {}", store_type);

    let store: Box<dyn CacheStore> = match store_type {
        "memory" => Box::new(InMemoryCacheStore::new()),
        "redis" => {
            let client = redis::Client::open(store_url).inspect_err(|e| {
                tracing::error!("Failed to create Redis client: {}", e);
            })?;
            Box::new(RedisCacheStore::new(client))
        }
        t => return Err(StorageError::UnsupportedType(t.to_string())),
    };

    store.init().await.inspect_err(|e| {
        tracing::error!("Failed to initialize cache store: {}", e);
    })?;

    tracing::info!("Connected to cache store: type={}", store_type);

    Ok(Arc::new(Mutex::new(store)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CacheData;

    #[tokio::test]
    async fn test_connect_memory_store() {
        let store = connect_cache_store("memory", "").await.expect("memory store");

        store
            .lock()
            .await
            .put("t", "k", CacheData { value: "v".into() })
            .await
            .unwrap();
        let got = store.lock().await.get("t", "k").await.unwrap();
        assert_eq!(got.unwrap().value, "v");
    }

    #[tokio::test]
    async fn test_connect_unsupported_store() {
        let result = connect_cache_store("memcached", "").await;
        assert!(matches!(result, Err(StorageError::UnsupportedType(t)) if t == "memcached"));
    }
}
