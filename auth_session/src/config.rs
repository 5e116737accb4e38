//! Central configuration for the auth-session crate

use std::sync::LazyLock;

/// Route prefix under which the login/logout endpoints are mounted.
///
/// Default: "/auth"
pub static AUTH_ROUTE_PREFIX: LazyLock<String> =
    LazyLock::new(|| std::env::var("AUTH_ROUTE_PREFIX").unwrap_or_else(|_| "/auth".to_string()));
