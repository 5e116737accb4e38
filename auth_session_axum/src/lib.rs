mod config;
mod error;
mod middleware;
mod pages;
mod router;
mod session;
mod state;

#[cfg(test)]
mod test_utils;

pub use config::{AUTH_LOGIN_URL, AUTH_REDIRECT_ANON, AUTH_REDIRECT_USER};
pub use error::IntoResponseError;
pub use middleware::{is_authenticated_401, is_authenticated_redirect};
pub use router::{auth_session_router, auth_session_router_no_trace};
pub use session::{AdminUser, AuthRejection, AuthUser};
pub use state::AuthState;

// Re-export the route prefix and initialization function from the core crate
pub use auth_session::{AUTH_ROUTE_PREFIX, init};
