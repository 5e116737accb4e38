//! Shared helpers for tests across the crate

use http::{HeaderMap, HeaderValue, header::COOKIE};

use crate::storage::connect_data_store;
use crate::userdb::{User, UserStore, hash_password_with_iterations};

/// Low work factor so password checks stay fast in debug builds
pub(crate) const TEST_HASH_ITERATIONS: u32 = 10;

/// A fresh, initialized user store backed by an in-memory SQLite database
pub(crate) async fn memory_user_store() -> UserStore {
    let data_store =
        connect_data_store("sqlite", "sqlite::memory:").expect("in-memory sqlite data store");
    let store = UserStore::new(data_store);
    store.init().await.expect("user table init");
    store
}

/// Persist a user with the given credentials
pub(crate) async fn insert_user(store: &UserStore, username: &str, password: &str) -> User {
    let hash = hash_password_with_iterations(password, TEST_HASH_ITERATIONS).expect("hash");
    let user = User::with_password_hash(username, hash).expect("new user");
    store.upsert_user(user).await.expect("upsert user")
}

/// Request headers carrying a single `Cookie` header built from `pairs`
pub(crate) fn request_with_cookies(pairs: &[(&str, &str)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if pairs.is_empty() {
        return headers;
    }
    let cookie = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("; ");
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&cookie).expect("valid cookie header"),
    );
    headers
}

/// All `Set-Cookie` values of a response, as strings
pub(crate) fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}
