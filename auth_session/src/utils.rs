use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use headers::{Cookie, HeaderMapExt};
use http::header::{HeaderMap, SET_COOKIE};
use ring::rand::SecureRandom;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Invalid format: {0}")]
    Format(String),
}

pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|_| UtilError::Format("Failed to decode base64url".to_string()))
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

pub(crate) fn gen_random_bytes(len: usize) -> Result<Vec<u8>, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random bytes".to_string()))?;
    Ok(bytes)
}

/// Generate a url-safe random string from `len` random bytes
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    Ok(base64url_encode(&gen_random_bytes(len)?))
}

/// Append a `Set-Cookie` header carrying `name=value` with the given max-age in seconds
pub(crate) fn header_set_cookie(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
    max_age: i64,
) -> Result<(), UtilError> {
    let cookie =
        format!("{name}={value}; SameSite=Lax; Secure; HttpOnly; Path=/; Max-Age={max_age}");
    tracing::trace!(cookie_name = %name, max_age, "Appending Set-Cookie header");
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie(format!("Failed to parse cookie: {name}")))?,
    );
    Ok(())
}

/// Append a `Set-Cookie` header that makes the browser drop the named cookie
pub(crate) fn header_clear_cookie(headers: &mut HeaderMap, name: &str) -> Result<(), UtilError> {
    header_set_cookie(headers, name, "", 0)
}

/// Read a single cookie value from the request `Cookie` headers
pub(crate) fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.typed_get::<Cookie>()?;
    cookies.get(name).map(str::to_string)
}
