use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::IntoResponseError;
use super::session::{AuthRejection, append_headers, authenticate};
use super::state::AuthState;

async fn check_authenticated(
    state: AuthState,
    mut req: Request,
    next: Next,
    redirect_on_error: bool,
) -> Response {
    let authenticated = match authenticate(&state, req.headers(), true)
        .await
        .into_response_error()
    {
        Ok(authenticated) => authenticated,
        Err(err) => return err.into_response(),
    };

    let Some(user) = authenticated.user else {
        let mut response =
            AuthRejection::unauthenticated(req.method(), req.uri(), redirect_on_error)
                .into_response();
        append_headers(response.headers_mut(), authenticated.headers);
        return response;
    };

    tracing::debug!(user_id = %user.id, "Authenticated request");
    req.extensions_mut().insert(user);
    let mut response = next.run(req).await;
    append_headers(response.headers_mut(), authenticated.headers);
    response
}

/// Authentication checker with 401 response
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn is_authenticated_401(
    State(state): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    check_authenticated(state, req, next, false).await
}

/// Authentication checker redirecting anonymous GET requests to the login page
pub async fn is_authenticated_redirect(
    State(state): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    check_authenticated(state, req, next, true).await
}
