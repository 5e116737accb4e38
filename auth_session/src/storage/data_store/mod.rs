mod config;
mod types;

pub use config::{connect_data_store, data_store_from_env};
pub use types::{DataStore, PostgresDataStore, SqliteDataStore};

pub(crate) use config::DB_TABLE_PREFIX;
