use axum::{
    Extension, Router,
    middleware::from_fn_with_state,
    response::{Html, IntoResponse},
    routing::get,
};

use auth_session_axum::{
    AdminUser, AuthState, AuthUser, is_authenticated_401, is_authenticated_redirect,
};

pub(super) fn router(state: AuthState) -> Router {
    Router::new()
        .route("/protected", get(protected))
        .route(
            "/dashboard",
            get(dashboard).route_layer(from_fn_with_state(
                state.clone(),
                is_authenticated_redirect,
            )),
        )
        .route(
            "/api/whoami",
            get(whoami).route_layer(from_fn_with_state(state.clone(), is_authenticated_401)),
        )
        .route("/admin", get(admin))
        .with_state(state)
}

// Anonymous visitors are redirected to the login page by the extractor
async fn protected(user: AuthUser) -> impl IntoResponse {
    Html(format!(
        "Hey {}!<br/>This page is only for signed-in users. <a href=\"/\">Home</a>",
        user.username
    ))
}

// The middleware already resolved the user and stored it in the request extensions
async fn dashboard(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    Html(format!("Dashboard of {}", user.username))
}

async fn whoami(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    user.username
}

async fn admin(AdminUser(user): AdminUser) -> impl IntoResponse {
    Html(format!("Welcome to the admin page, {}.", user.username))
}
