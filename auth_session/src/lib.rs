//! auth-session - Session-scoped sign-in state with "remember me" cookies
//!
//! This crate tracks whether a visitor is signed in, checks usernames and
//! passwords against a user store, and can re-authenticate returning visitors
//! from a `USER`/`AUTH` cookie pair.

mod config;
mod session;
mod storage;
mod userdb;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::AUTH_ROUTE_PREFIX;

pub use session::{
    AUTH_COOKIE_NAME, AuthContext, AuthSession, AuthSettings, SESSION_COOKIE_MAX_AGE,
    SESSION_COOKIE_NAME, SIGN_IN_COOKIE_MAX_AGE, SessionError, SessionState, USERNAME_COOKIE_NAME,
    delete_session, load_session, save_session,
};

pub use storage::{
    CacheData, CacheStore, DataStore, InMemoryCacheStore, PostgresDataStore, RedisCacheStore,
    SharedCacheStore, SqliteDataStore, StorageError, cache_store_from_env, connect_cache_store,
    connect_data_store, data_store_from_env,
};

pub use userdb::{
    AuthUser, CaseInsensitiveUsername, CookieAuth, ExactUsername, Role, User, UserCriteria,
    UserCriteriaBuilder, UserError, UserId, UserRepository, UserStore, hash_password,
    verify_password,
};

pub use utils::{UtilError, gen_random_string};

/// Open the data and cache stores configured in the environment and prepare the users table
pub async fn init() -> Result<(UserStore, SharedCacheStore), Box<dyn std::error::Error>> {
    let users = UserStore::new(data_store_from_env()?);
    users.init().await?;
    let sessions = cache_store_from_env().await?;
    Ok((users, sessions))
}
