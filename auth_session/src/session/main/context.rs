use http::HeaderMap;

use crate::session::config::AuthSettings;
use crate::userdb::UserRepository;

/// Everything one request's sign-in operations work against.
///
/// The repository borrow lasts for the request only; response cookies
/// accumulate in `response_headers` and are handed back to the transport
/// with [`AuthContext::into_response_headers`].
pub struct AuthContext<'a, R: UserRepository> {
    pub(crate) users: &'a R,
    pub(crate) settings: &'a AuthSettings,
    pub(crate) request_headers: &'a HeaderMap,
    pub(crate) response_headers: HeaderMap,
}

impl<'a, R: UserRepository> AuthContext<'a, R> {
    pub fn new(users: &'a R, settings: &'a AuthSettings, request_headers: &'a HeaderMap) -> Self {
        Self {
            users,
            settings,
            request_headers,
            response_headers: HeaderMap::new(),
        }
    }

    pub fn settings(&self) -> &AuthSettings {
        self.settings
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    pub fn into_response_headers(self) -> HeaderMap {
        self.response_headers
    }
}
