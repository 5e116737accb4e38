use askama::Template;
use auth_session::{AUTH_ROUTE_PREFIX, AuthContext, delete_session, load_session, save_session};
use axum::{
    extract::{Form, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::config::AUTH_REDIRECT_USER;
use crate::error::IntoResponseError;
use crate::session::{AuthUser, append_headers, safe_redirect};
use crate::state::AuthState;

#[derive(Template)]
#[template(path = "login.j2", escape = "html")]
struct LoginTemplate<'a> {
    message: &'a str,
    route_prefix: &'a str,
    next: &'a str,
}

#[derive(Deserialize)]
pub(super) struct LoginQuery {
    next: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct LoginForm {
    username: String,
    password: String,
    /// Present (as "on") only when the checkbox is ticked
    remember_me: Option<String>,
    next: Option<String>,
}

fn render_login(message: &str, next: Option<&str>) -> Result<Html<String>, (StatusCode, String)> {
    let template = LoginTemplate {
        message,
        route_prefix: AUTH_ROUTE_PREFIX.as_str(),
        next: safe_redirect(next).unwrap_or(""),
    };
    Ok(Html(template.render().into_response_error()?))
}

fn landing_page(next: Option<&str>) -> &str {
    safe_redirect(next).unwrap_or(AUTH_REDIRECT_USER.as_str())
}

pub(super) async fn login_page(
    user: Option<AuthUser>,
    Query(query): Query<LoginQuery>,
) -> Result<Response, (StatusCode, String)> {
    match user {
        Some(_) => Ok(Redirect::to(landing_page(query.next.as_deref())).into_response()),
        None => Ok(render_login("", query.next.as_deref())?.into_response()),
    }
}

pub(super) async fn login_submit(
    State(state): State<AuthState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    let (old_session_id, mut session) = load_session(&state.sessions, &headers)
        .await
        .into_response_error()?;

    let mut ctx = AuthContext::new(state.users.as_ref(), &state.settings, &headers);
    let remember_me = form.remember_me.is_some();
    let signed_in = session
        .sign_in(&mut ctx, &form.username, &form.password, remember_me)
        .await
        .into_response_error()?;

    if !signed_in {
        tracing::info!(username = %form.username, "Login failed");
        let html = render_login("Invalid username or password", form.next.as_deref())?;
        return Ok((StatusCode::UNAUTHORIZED, html).into_response());
    }

    let mut response_headers = ctx.into_response_headers();

    // New session id on every login
    if let Some(old_session_id) = &old_session_id {
        delete_session(&state.sessions, old_session_id)
            .await
            .into_response_error()?;
    }
    let session_headers = save_session(&state.sessions, None, &session)
        .await
        .into_response_error()?;
    append_headers(&mut response_headers, session_headers);

    let target = landing_page(form.next.as_deref());
    tracing::debug!("Login succeeded, redirecting to {}", target);
    Ok((response_headers, Redirect::to(target)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{cookie_headers, set_cookie_pairs, test_state};
    use auth_session::SESSION_COOKIE_NAME;
    use http::header::LOCATION;

    fn form(password: &str, remember_me: bool) -> LoginForm {
        LoginForm {
            username: "alice".to_string(),
            password: password.to_string(),
            remember_me: remember_me.then(|| "on".to_string()),
            next: Some("/protected".to_string()),
        }
    }

    fn cookie_names(response: &Response) -> Vec<String> {
        set_cookie_pairs(response.headers())
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    #[tokio::test]
    async fn test_login_submit_with_remember_me() {
        let state = test_state().await;
        state.users.create_user("alice", "hunter2").await.unwrap();

        let response = login_submit(State(state), HeaderMap::new(), Form(form("hunter2", true)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/protected");
        assert_eq!(
            cookie_names(&response),
            ["USER", "AUTH", SESSION_COOKIE_NAME.as_str()]
        );
    }

    #[tokio::test]
    async fn test_login_submit_without_remember_me() {
        let state = test_state().await;
        state.users.create_user("alice", "hunter2").await.unwrap();

        let response = login_submit(State(state), HeaderMap::new(), Form(form("hunter2", false)))
            .await
            .unwrap();

        assert_eq!(cookie_names(&response), [SESSION_COOKIE_NAME.as_str()]);
    }

    #[tokio::test]
    async fn test_login_submit_wrong_password() {
        let state = test_state().await;
        state.users.create_user("alice", "hunter2").await.unwrap();

        let response = login_submit(State(state), HeaderMap::new(), Form(form("nope", true)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(cookie_names(&response).is_empty());
    }

    #[tokio::test]
    async fn test_login_rotates_session_id() {
        let state = test_state().await;
        state.users.create_user("alice", "hunter2").await.unwrap();

        let first = login_submit(
            State(state.clone()),
            HeaderMap::new(),
            Form(form("hunter2", false)),
        )
        .await
        .unwrap();
        let (_, first_id) = set_cookie_pairs(first.headers()).remove(0);

        let request = cookie_headers(&[(SESSION_COOKIE_NAME.as_str(), first_id.as_str())]);
        let second = login_submit(State(state), request, Form(form("hunter2", false)))
            .await
            .unwrap();
        let (_, second_id) = set_cookie_pairs(second.headers()).remove(0);

        assert_ne!(first_id, second_id);
    }

    #[tokio::test]
    async fn test_login_page_redirects_signed_in_user() {
        let state = test_state().await;
        let user = state.users.create_user("alice", "hunter2").await.unwrap();

        let response = login_page(
            Some(AuthUser::from(user)),
            Query(LoginQuery {
                next: Some("/dashboard".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.headers()[LOCATION], "/dashboard");

        let response = login_page(None, Query(LoginQuery { next: None }))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_render_login_escapes_message() {
        let html = render_login("<b>bad</b>", None).unwrap().0;
        assert!(html.contains("&lt;b&gt;bad"));
        assert!(!html.contains("<b>bad"));
    }

    #[test]
    fn test_render_login_drops_unsafe_next() {
        let html = render_login("", Some("https://evil.example")).unwrap().0;
        assert!(!html.contains("evil.example"));

        let html = render_login("", Some("/protected")).unwrap().0;
        assert!(html.contains("protected"));
    }

    #[test]
    fn test_landing_page() {
        assert_eq!(landing_page(Some("/dashboard")), "/dashboard");
        assert_eq!(landing_page(Some("//evil.example")), "/");
        assert_eq!(landing_page(None), "/");
    }
}
