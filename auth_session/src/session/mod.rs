mod config;
mod errors;
mod main;
mod types;

pub use config::{
    AUTH_COOKIE_NAME, AuthSettings, SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME,
    SIGN_IN_COOKIE_MAX_AGE, USERNAME_COOKIE_NAME,
};
pub use errors::SessionError;
pub use main::{AuthContext, AuthSession, delete_session, load_session, save_session};
pub use types::SessionState;
