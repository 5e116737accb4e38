use std::sync::LazyLock;

use auth_session::AUTH_ROUTE_PREFIX;

/// URL of the login page
/// Default: "/auth/login"
pub static AUTH_LOGIN_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("AUTH_LOGIN_URL").unwrap_or_else(|_| format!("{}/login", *AUTH_ROUTE_PREFIX))
});

/// Where anonymous visitors of protected GET pages are sent
/// Default: the login page
pub static AUTH_REDIRECT_ANON: LazyLock<String> = LazyLock::new(|| {
    std::env::var("AUTH_REDIRECT_ANON").unwrap_or_else(|_| AUTH_LOGIN_URL.clone())
});

/// Where signed-in users land after logging in
/// Default: "/"
pub static AUTH_REDIRECT_USER: LazyLock<String> =
    LazyLock::new(|| std::env::var("AUTH_REDIRECT_USER").unwrap_or_else(|_| "/".to_string()));
