use http::HeaderMap;

use crate::session::config::{AUTH_COOKIE_NAME, USERNAME_COOKIE_NAME};
use crate::session::errors::SessionError;
use crate::utils::{get_cookie_value, header_clear_cookie, header_set_cookie};

/// Username and token presented by the browser
#[derive(Debug)]
pub(super) struct SignInCookies {
    pub(super) username: String,
    pub(super) token: String,
}

/// Both remember-me cookies, or `None` if either is missing.
///
/// The username is stored percent-encoded so any name fits in a cookie value.
pub(super) fn read_sign_in_cookies(headers: &HeaderMap) -> Option<SignInCookies> {
    let encoded = get_cookie_value(headers, USERNAME_COOKIE_NAME)?;
    let token = get_cookie_value(headers, AUTH_COOKIE_NAME)?;
    let username = match urlencoding::decode(&encoded) {
        Ok(username) => username.into_owned(),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring undecodable username cookie");
            return None;
        }
    };
    Some(SignInCookies { username, token })
}

pub(super) fn write_sign_in_cookies(
    headers: &mut HeaderMap,
    username: &str,
    token: &str,
    max_age: i64,
) -> Result<(), SessionError> {
    header_set_cookie(
        headers,
        USERNAME_COOKIE_NAME,
        &urlencoding::encode(username),
        max_age,
    )?;
    header_set_cookie(headers, AUTH_COOKIE_NAME, token, max_age)?;
    Ok(())
}

pub(super) fn clear_sign_in_cookies(headers: &mut HeaderMap) -> Result<(), SessionError> {
    header_clear_cookie(headers, AUTH_COOKIE_NAME)?;
    header_clear_cookie(headers, USERNAME_COOKIE_NAME)?;
    Ok(())
}
