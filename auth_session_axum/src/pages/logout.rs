use auth_session::{AuthContext, load_session, save_session};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::error::IntoResponseError;
use crate::session::{append_headers, safe_redirect};
use crate::state::AuthState;

#[derive(Deserialize)]
pub(super) struct RedirectQuery {
    redirect: Option<String>,
}

/// Handles logout requests with optional redirection
///
/// Clears the remember-me cookies and the stored session. Without a
/// `redirect` parameter only the headers are returned, for API calls.
pub(super) async fn logout(
    State(state): State<AuthState>,
    headers: HeaderMap,
    Query(params): Query<RedirectQuery>,
) -> Result<Response, (StatusCode, String)> {
    let (session_id, mut session) = load_session(&state.sessions, &headers)
        .await
        .into_response_error()?;

    let mut ctx = AuthContext::new(state.users.as_ref(), &state.settings, &headers);
    session.sign_out(&mut ctx).into_response_error()?;
    let mut response_headers = ctx.into_response_headers();

    let session_headers = save_session(&state.sessions, session_id.as_deref(), &session)
        .await
        .into_response_error()?;
    append_headers(&mut response_headers, session_headers);

    match safe_redirect(params.redirect.as_deref()) {
        Some(redirect_to) => {
            tracing::debug!("Redirecting to {}", redirect_to);
            Ok((response_headers, Redirect::to(redirect_to)).into_response())
        }
        None => {
            tracing::debug!("No redirect specified, returning headers");
            Ok((response_headers, StatusCode::OK).into_response())
        }
    }
}
