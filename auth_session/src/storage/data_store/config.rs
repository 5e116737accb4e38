//! Data store construction

use std::{env, str::FromStr, sync::LazyLock};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::storage::errors::StorageError;

use super::types::{DataStore, PostgresDataStore, SqliteDataStore};

/// Table prefix from environment variable
pub(crate) static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| "auth_".to_string()));

/// Build a data store from `GENERIC_DATA_STORE_TYPE` and `GENERIC_DATA_STORE_URL`
pub fn data_store_from_env() -> Result<Box<dyn DataStore>, StorageError> {
    let store_type = env::var("GENERIC_DATA_STORE_TYPE")
        .map_err(|_| StorageError::Storage("GENERIC_DATA_STORE_TYPE must be set".to_string()))?;
    let store_url = env::var("GENERIC_DATA_STORE_URL")
        .map_err(|_| StorageError::Storage("GENERIC_DATA_STORE_URL must be set".to_string()))?;

    connect_data_store(&store_type, &store_url)
}

/// Create a lazily connecting pool for the given store type ("sqlite" or "postgres")
pub fn connect_data_store(
    store_type: &str,
    store_url: &str,
) -> Result<Box<dyn DataStore>, StorageError> {
    tracing::info!(
        "Initializing data store with type: {}, url: {}",
        store_type,
        store_url
    );

    let store: Box<dyn DataStore> = match store_type {
        "sqlite" => {
            let opts = SqliteConnectOptions::from_str(store_url)?.create_if_missing(true);

            // Every connection to an in-memory database opens a fresh one
            let pool = if store_url.contains(":memory:") {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_lazy_with(opts)
            } else {
                SqlitePoolOptions::new().connect_lazy_with(opts)
            };

            Box::new(SqliteDataStore { pool })
        }
        "postgres" => Box::new(PostgresDataStore {
            pool: sqlx::PgPool::connect_lazy(store_url)?,
        }),
        t => return Err(StorageError::UnsupportedType(t.to_string())),
    };

    tracing::info!("Data store ready: type={}", store_type);

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_unsupported_store_type() {
        let result = connect_data_store("mongodb", "mongodb://localhost");
        assert!(matches!(result, Err(StorageError::UnsupportedType(t)) if t == "mongodb"));
    }

    #[tokio::test]
    async fn test_connect_sqlite_memory() {
        let store = connect_data_store("sqlite", "sqlite::memory:").expect("sqlite store");
        assert!(store.as_sqlite().is_some());
        assert!(store.as_postgres().is_none());
    }
}
