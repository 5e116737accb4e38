use axum::{Router, routing::get};

use crate::state::AuthState;

/// Login, logout and user info endpoints
pub(crate) fn router() -> Router<AuthState> {
    Router::new()
        .route(
            "/login",
            get(super::login::login_page).post(super::login::login_submit),
        )
        .route("/logout", get(super::logout::logout))
        .route("/user/info", get(super::user::user_info))
}
