//! Shared helpers for tests across the crate

use auth_session::{AuthSettings, UserStore, connect_cache_store, connect_data_store};
use http::{HeaderMap, HeaderValue, header::COOKIE, header::SET_COOKIE};

use crate::state::AuthState;

/// State over an in-memory SQLite user table and an in-memory session cache
pub(crate) async fn test_state() -> AuthState {
    let data_store =
        connect_data_store("sqlite", "sqlite::memory:").expect("in-memory sqlite data store");
    let users = UserStore::new(data_store);
    users.init().await.expect("user table init");
    let sessions = connect_cache_store("memory", "")
        .await
        .expect("memory cache store");
    AuthState::new(users, AuthSettings::new(), sessions)
}

/// Request headers carrying the given cookies
pub(crate) fn cookie_headers(pairs: &[(&str, &str)]) -> HeaderMap {
    let cookie = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("; ");
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&cookie).expect("cookie header"));
    headers
}

/// `(name, value)` of every `Set-Cookie` header, in order
pub(crate) fn set_cookie_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
