use auth_session::{
    AuthContext, AuthUser as _, Role, SessionError, User, delete_session, load_session,
    save_session,
};
use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use http::{HeaderMap, Method, StatusCode, Uri, request::Parts};
use serde::Serialize;

use super::config::AUTH_REDIRECT_ANON;
use super::error::IntoResponseError;
use super::state::AuthState;

/// Why a request was refused by an extractor or middleware
#[derive(Debug)]
pub enum AuthRejection {
    /// Nobody is signed in. `next` is set when the visitor is sent to the login page
    Unauthenticated { next: Option<String> },
    /// Signed in, but without the required role
    Forbidden,
    Failed(StatusCode, String),
}

impl AuthRejection {
    /// Redirect GET requests when `redirect` is set, plain 401 otherwise
    pub(crate) fn unauthenticated(method: &Method, uri: &Uri, redirect: bool) -> Self {
        let next = (redirect && *method == Method::GET).then(|| {
            uri.path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string())
        });
        Self::Unauthenticated { next }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated { next: Some(next) } => {
                let target = login_redirect_target(AUTH_REDIRECT_ANON.as_str(), &next);
                tracing::debug!("Redirecting to {}", target);
                Redirect::temporary(&target).into_response()
            }
            Self::Unauthenticated { next: None } => {
                tracing::debug!("Unauthorized");
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
            Self::Failed(status, message) => (status, message).into_response(),
        }
    }
}

/// Redirect target for an anonymous visitor, remembering where they were going
fn login_redirect_target(redirect_anon: &str, path: &str) -> String {
    let separator = if redirect_anon.contains('?') { '&' } else { '?' };
    format!(
        "{redirect_anon}{separator}next={}",
        urlencoding::encode(path)
    )
}

/// Accept only same-site relative paths as post-login or post-logout targets
pub(crate) fn safe_redirect(target: Option<&str>) -> Option<&str> {
    target.filter(|t| t.starts_with('/') && !t.starts_with("//") && !t.starts_with("/\\"))
}

/// Append every header of `src` to `dst`, keeping repeated `Set-Cookie` values
pub(crate) fn append_headers(dst: &mut HeaderMap, src: HeaderMap) {
    let mut current = None;
    for (name, value) in src {
        if let Some(name) = name {
            current = Some(name);
        }
        if let Some(name) = &current {
            dst.append(name.clone(), value);
        }
    }
}

/// Signed-in user of the current request, available as an axum extractor
///
/// Extraction restores the visitor session, falls back to the `USER`/`AUTH`
/// remember-me cookies, and loads a fresh copy of the user record.
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use auth_session_axum::{AuthState, AuthUser};
///
/// async fn protected_handler(user: AuthUser) -> String {
///     format!("Hello, {}!", user.username)
/// }
///
/// let app: Router<AuthState> = Router::new()
///     .route("/protected", get(protected_handler));
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        let is_admin = user.has_any_role(&[Role::Admin]);
        AuthUser {
            id: user.id,
            username: user.username,
            is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Outcome of checking a request's sign-in state
pub(crate) struct Authenticated {
    pub(crate) user: Option<AuthUser>,
    /// `Set-Cookie` headers that should reach the browser
    pub(crate) headers: HeaderMap,
}

/// Restore the visitor session, run the cookie fallback and load the current user.
///
/// A change of the signed-in identity is written back to the session store.
/// A sign-in from the remember-me cookies always gets a fresh session id; any
/// id the request presented is dropped. With `issue_cookie` false that fresh
/// session is not stored, since its id could not reach the browser.
pub(crate) async fn authenticate(
    state: &AuthState,
    request_headers: &HeaderMap,
    issue_cookie: bool,
) -> Result<Authenticated, SessionError> {
    let (session_id, mut session) = load_session(&state.sessions, request_headers).await?;
    let before = session.user_id().cloned();

    let mut ctx = AuthContext::new(state.users.as_ref(), &state.settings, request_headers);
    let user = session.current_user(&mut ctx).await?;
    let mut headers = ctx.into_response_headers();

    if session.user_id() != before.as_ref() {
        tracing::debug!(signed_in = session.user_id().is_some(), "Session identity changed");
        let session_headers = if before.is_none() {
            if let Some(old_id) = session_id.as_deref() {
                delete_session(&state.sessions, old_id).await?;
            }
            if issue_cookie {
                Some(save_session(&state.sessions, None, &session).await?)
            } else {
                None
            }
        } else {
            Some(save_session(&state.sessions, session_id.as_deref(), &session).await?)
        };
        if let Some(session_headers) = session_headers {
            append_headers(&mut headers, session_headers);
        }
    }

    Ok(Authenticated {
        user: user.map(AuthUser::from),
        headers,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match <AuthUser as OptionalFromRequestParts<S>>::from_request_parts(parts, state).await? {
            Some(user) => Ok(user),
            None => Err(AuthRejection::unauthenticated(
                &parts.method,
                &parts.uri,
                true,
            )),
        }
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        // Already resolved by the authentication middleware
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(Some(user.clone()));
        }

        let state = AuthState::from_ref(state);
        let authenticated = authenticate(&state, &parts.headers, false)
            .await
            .into_response_error()
            .map_err(|(status, message)| AuthRejection::Failed(status, message))?;
        Ok(authenticated.user)
    }
}

/// Signed-in user holding the admin role
#[derive(Clone, Debug)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await?;
        if !user.is_admin {
            tracing::warn!(user_id = %user.id, "Admin role required");
            return Err(AuthRejection::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{LOCATION, SET_COOKIE};

    fn rejection(method: Method, uri: &str, redirect: bool) -> AuthRejection {
        AuthRejection::unauthenticated(&method, &uri.parse().unwrap(), redirect)
    }

    #[test]
    fn test_unauthenticated_get_redirects_to_login() {
        let response = rejection(Method::GET, "/protected?x=1", true).into_response();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/auth/login?next=%2Fprotected%3Fx%3D1"
        );
    }

    #[test]
    fn test_unauthenticated_other_methods_are_401() {
        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let response = rejection(method, "/", true).into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_unauthenticated_get_without_redirect_is_401() {
        let response = rejection(Method::GET, "/api/data", false).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_forbidden_and_failed() {
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        let failed = AuthRejection::Failed(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
        assert_eq!(
            failed.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_login_redirect_target_with_existing_query() {
        assert_eq!(
            login_redirect_target("/login?theme=dark", "/a"),
            "/login?theme=dark&next=%2Fa"
        );
    }

    #[test]
    fn test_safe_redirect() {
        assert_eq!(safe_redirect(Some("/home")), Some("/home"));
        assert_eq!(safe_redirect(Some("//evil.example")), None);
        assert_eq!(safe_redirect(Some("/\\evil.example")), None);
        assert_eq!(safe_redirect(Some("https://evil.example")), None);
        assert_eq!(safe_redirect(None), None);
    }

    #[test]
    fn test_append_headers_keeps_every_cookie() {
        let mut dst = HeaderMap::new();
        dst.append(SET_COOKIE, "a=1".parse().unwrap());

        let mut src = HeaderMap::new();
        src.append(SET_COOKIE, "b=2".parse().unwrap());
        src.append(SET_COOKIE, "c=3".parse().unwrap());

        append_headers(&mut dst, src);
        let values: Vec<_> = dst.get_all(SET_COOKIE).iter().collect();
        assert_eq!(values, ["a=1", "b=2", "c=3"]);
    }

    #[test]
    fn test_from_user_maps_admin_role() {
        let mut user = User::new("alice", "pw").unwrap();
        user.is_admin = true;
        let id = user.id.clone();

        let auth_user = AuthUser::from(user);
        assert_eq!(auth_user.id, id);
        assert_eq!(auth_user.username, "alice");
        assert!(auth_user.is_admin);
    }

    #[tokio::test]
    async fn test_authenticate_from_remember_me_cookies() {
        let state = crate::test_utils::test_state().await;
        let user = state.users.create_user("alice", "hunter2").await.unwrap();
        let request = crate::test_utils::cookie_headers(&[
            ("USER", "alice"),
            ("AUTH", user.auth_token.as_str()),
        ]);

        let quiet = authenticate(&state, &request, false).await.unwrap();
        assert_eq!(quiet.user.map(|u| u.id), Some(user.id.clone()));
        assert!(quiet.headers.is_empty());

        let issued = authenticate(&state, &request, true).await.unwrap();
        assert!(issued.user.is_some());
        let cookies = crate::test_utils::set_cookie_pairs(&issued.headers);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].0, auth_session::SESSION_COOKIE_NAME.as_str());
    }

    #[tokio::test]
    async fn test_remember_me_sign_in_never_reuses_presented_session_id() {
        let state = crate::test_utils::test_state().await;
        let user = state.users.create_user("alice", "hunter2").await.unwrap();
        let session_cookie = auth_session::SESSION_COOKIE_NAME.as_str();
        let request = crate::test_utils::cookie_headers(&[
            (session_cookie, "chosen-by-client"),
            ("USER", "alice"),
            ("AUTH", user.auth_token.as_str()),
        ]);

        let quiet = authenticate(&state, &request, false).await.unwrap();
        assert!(quiet.user.is_some());
        assert!(quiet.headers.is_empty());

        let issued = authenticate(&state, &request, true).await.unwrap();
        let cookies = crate::test_utils::set_cookie_pairs(&issued.headers);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].0, session_cookie);
        assert_ne!(cookies[0].1, "chosen-by-client");

        let replayed = crate::test_utils::cookie_headers(&[(session_cookie, "chosen-by-client")]);
        let result = authenticate(&state, &replayed, true).await.unwrap();
        assert!(result.user.is_none());

        let fresh = crate::test_utils::cookie_headers(&[(session_cookie, cookies[0].1.as_str())]);
        let result = authenticate(&state, &fresh, true).await.unwrap();
        assert_eq!(result.user.map(|u| u.id), Some(user.id));
        assert!(result.headers.is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_anonymous() {
        let state = crate::test_utils::test_state().await;
        let result = authenticate(&state, &HeaderMap::new(), true).await.unwrap();
        assert!(result.user.is_none());
        assert!(result.headers.is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_deleted_user_drops_session() {
        let state = crate::test_utils::test_state().await;
        let user = state.users.create_user("alice", "hunter2").await.unwrap();
        let session = auth_session::AuthSession::with_user_id(user.user_id());
        save_session(&state.sessions, Some("sid"), &session)
            .await
            .unwrap();
        state.users.delete_user(&user.id).await.unwrap();

        let request = crate::test_utils::cookie_headers(&[(
            auth_session::SESSION_COOKIE_NAME.as_str(),
            "sid",
        )]);
        let result = authenticate(&state, &request, true).await.unwrap();
        assert!(result.user.is_none());

        let cookies = crate::test_utils::set_cookie_pairs(&result.headers);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].1.is_empty());
    }
}
