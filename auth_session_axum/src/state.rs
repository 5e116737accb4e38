use std::sync::Arc;

use auth_session::{AuthSettings, SharedCacheStore, UserStore};

/// Shared application state for the sign-in routes, extractors and middleware
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<UserStore>,
    pub settings: Arc<AuthSettings>,
    pub sessions: SharedCacheStore,
}

impl AuthState {
    pub fn new(users: UserStore, settings: AuthSettings, sessions: SharedCacheStore) -> Self {
        Self {
            users: Arc::new(users),
            settings: Arc::new(settings),
            sessions,
        }
    }
}
