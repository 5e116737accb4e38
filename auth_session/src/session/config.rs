use std::fmt;
use std::sync::{Arc, LazyLock};

use chrono::Duration;

use crate::userdb::{ExactUsername, UserCriteria, UserCriteriaBuilder};

/// Cookie carrying the re-authentication token
pub const AUTH_COOKIE_NAME: &str = "AUTH";
/// Cookie carrying the username
pub const USERNAME_COOKIE_NAME: &str = "USER";

const DEFAULT_SIGN_IN_COOKIE_MAX_AGE: u64 = 31 * 24 * 60 * 60;

/// Lifetime of the remember-me cookie pair in seconds. Default: 31 days
pub static SIGN_IN_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    parse_max_age(
        std::env::var("SIGN_IN_COOKIE_MAX_AGE").ok().as_deref(),
        DEFAULT_SIGN_IN_COOKIE_MAX_AGE,
    )
});

/// Name of the cookie holding the per-visitor session id
pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "__Host-SessionId".to_string())
});

/// Lifetime of the per-visitor session record in seconds. Default: 1 hour
pub static SESSION_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    parse_max_age(std::env::var("SESSION_COOKIE_MAX_AGE").ok().as_deref(), 3600)
});

/// Upper bound for configured max-ages: the 400-day limit browsers apply to cookies
const MAX_CONFIGURED_MAX_AGE: u64 = 400 * 24 * 60 * 60;

fn parse_max_age(value: Option<&str>, default: u64) -> u64 {
    let Some(value) = value else {
        return default;
    };
    match value.parse::<u64>() {
        Ok(secs) if secs <= MAX_CONFIGURED_MAX_AGE => secs,
        _ => {
            tracing::warn!(value, default, "Ignoring invalid max-age setting");
            default
        }
    }
}

/// Application-level settings for signing users in
#[derive(Clone)]
pub struct AuthSettings {
    criteria_builder: Arc<dyn UserCriteriaBuilder>,
    cookie_max_age: Duration,
}

impl AuthSettings {
    pub fn new() -> Self {
        Self {
            criteria_builder: Arc::new(ExactUsername),
            cookie_max_age: Duration::seconds(*SIGN_IN_COOKIE_MAX_AGE as i64),
        }
    }

    pub fn with_criteria_builder(mut self, builder: impl UserCriteriaBuilder + 'static) -> Self {
        self.criteria_builder = Arc::new(builder);
        self
    }

    pub fn with_cookie_max_age(mut self, max_age: Duration) -> Self {
        self.cookie_max_age = max_age;
        self
    }

    pub fn user_criteria(&self, username: &str) -> UserCriteria {
        self.criteria_builder.build(username)
    }

    pub fn cookie_max_age(&self) -> Duration {
        self.cookie_max_age
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("cookie_max_age", &self.cookie_max_age)
            .finish_non_exhaustive()
    }
}
