mod config;
mod memory;
mod redis;
mod types;

pub use config::{SharedCacheStore, cache_store_from_env, connect_cache_store};
pub use types::{CacheStore, InMemoryCacheStore, RedisCacheStore};
