use chrono::{Duration, Utc};
use http::HeaderMap;

use crate::session::config::{SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME};
use crate::session::errors::SessionError;
use crate::session::types::StoredSession;
use crate::storage::SharedCacheStore;
use crate::utils::{gen_random_string, get_cookie_value, header_clear_cookie, header_set_cookie};

use super::auth_session::AuthSession;

const SESSION_PREFIX: &str = "session";

/// Restore the visitor's session from the session-id cookie.
///
/// Returns the session id found in the request (if any) and the session.
/// Missing, unknown or expired records give a session in the `Unknown` state.
/// The returned id is whatever the browser sent; a new sign-in must be saved
/// under a fresh id, never under this one.
pub async fn load_session(
    cache: &SharedCacheStore,
    headers: &HeaderMap,
) -> Result<(Option<String>, AuthSession), SessionError> {
    let Some(session_id) = get_cookie_value(headers, SESSION_COOKIE_NAME.as_str()) else {
        return Ok((None, AuthSession::new()));
    };

    let cached = cache.lock().await.get(SESSION_PREFIX, &session_id).await?;
    let Some(cached) = cached else {
        tracing::debug!("No stored session for session cookie");
        return Ok((Some(session_id), AuthSession::new()));
    };

    let stored: StoredSession = match cached.try_into() {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable stored session");
            cache.lock().await.remove(SESSION_PREFIX, &session_id).await?;
            return Ok((Some(session_id), AuthSession::new()));
        }
    };

    if stored.expires_at < Utc::now() {
        tracing::debug!("Session expired at {}", stored.expires_at);
        cache.lock().await.remove(SESSION_PREFIX, &session_id).await?;
        return Ok((Some(session_id), AuthSession::new()));
    }

    Ok((Some(session_id), AuthSession::with_user_id(stored.user_id)))
}

/// Persist the session and return the `Set-Cookie` headers for its id.
///
/// A signed-in session is stored under `session_id`, or under a new random id
/// when none is given. Any other state removes the stored record and clears
/// the session cookie.
pub async fn save_session(
    cache: &SharedCacheStore,
    session_id: Option<&str>,
    session: &AuthSession,
) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();

    let Some(user_id) = session.user_id() else {
        if let Some(session_id) = session_id {
            delete_session(cache, session_id).await?;
            header_clear_cookie(&mut headers, SESSION_COOKIE_NAME.as_str())?;
        }
        return Ok(headers);
    };

    let session_id = match session_id {
        Some(id) => id.to_string(),
        None => gen_random_string(32)?,
    };
    let ttl = *SESSION_COOKIE_MAX_AGE;

    let stored = StoredSession {
        user_id: user_id.clone(),
        expires_at: Utc::now() + Duration::seconds(ttl as i64),
        ttl,
    };

    cache
        .lock()
        .await
        .put_with_ttl(SESSION_PREFIX, &session_id, stored.try_into()?, ttl as usize)
        .await?;

    header_set_cookie(
        &mut headers,
        SESSION_COOKIE_NAME.as_str(),
        &session_id,
        ttl as i64,
    )?;

    Ok(headers)
}

pub async fn delete_session(
    cache: &SharedCacheStore,
    session_id: &str,
) -> Result<(), SessionError> {
    cache.lock().await.remove(SESSION_PREFIX, session_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CacheData, connect_cache_store};
    use crate::test_utils::{request_with_cookies, set_cookies};
    use crate::userdb::UserId;

    async fn memory_cache() -> SharedCacheStore {
        connect_cache_store("memory", "").await.expect("memory cache")
    }

    fn session_id_from(headers: &HeaderMap) -> String {
        let cookie = set_cookies(headers).pop().expect("session cookie");
        let (pair, _) = cookie.split_once(';').expect("attributes");
        let (_, value) = pair.split_once('=').expect("name=value");
        value.to_string()
    }

    #[tokio::test]
    async fn test_load_without_cookie() {
        let cache = memory_cache().await;
        let (id, session) = load_session(&cache, &HeaderMap::new()).await.unwrap();
        assert!(id.is_none());
        assert!(session.user_id().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_signed_in_session() {
        let cache = memory_cache().await;
        let session = AuthSession::with_user_id(UserId::new("u-1"));

        let headers = save_session(&cache, None, &session).await.unwrap();
        let session_id = session_id_from(&headers);

        let request = request_with_cookies(&[(SESSION_COOKIE_NAME.as_str(), session_id.as_str())]);
        let (id, loaded) = load_session(&cache, &request).await.unwrap();
        assert_eq!(id.as_deref(), Some(session_id.as_str()));
        assert_eq!(loaded.user_id().map(UserId::as_str), Some("u-1"));
    }

    #[tokio::test]
    async fn test_save_reuses_given_session_id() {
        let cache = memory_cache().await;
        let session = AuthSession::with_user_id(UserId::new("u-1"));

        let headers = save_session(&cache, Some("fixed-id"), &session)
            .await
            .unwrap();
        assert_eq!(session_id_from(&headers), "fixed-id");
    }

    #[tokio::test]
    async fn test_save_signed_out_without_id_stores_nothing() {
        let cache = memory_cache().await;
        let headers = save_session(&cache, None, &AuthSession::new()).await.unwrap();
        assert!(headers.is_empty());
    }

    #[tokio::test]
    async fn test_save_signed_out_removes_record_and_cookie() {
        let cache = memory_cache().await;
        let signed_in = AuthSession::with_user_id(UserId::new("u-1"));
        save_session(&cache, Some("sid"), &signed_in).await.unwrap();

        let headers = save_session(&cache, Some("sid"), &AuthSession::new())
            .await
            .unwrap();

        let cookies = set_cookies(&headers);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].ends_with("Max-Age=0"));
        assert!(cache.lock().await.get(SESSION_PREFIX, "sid").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_discarded() {
        let cache = memory_cache().await;
        let stored = StoredSession {
            user_id: UserId::new("u-1"),
            expires_at: Utc::now() - Duration::hours(1),
            ttl: 3600,
        };
        cache
            .lock()
            .await
            .put(SESSION_PREFIX, "old", stored.try_into().unwrap())
            .await
            .unwrap();

        let request = request_with_cookies(&[(SESSION_COOKIE_NAME.as_str(), "old")]);
        let (_, session) = load_session(&cache, &request).await.unwrap();

        assert!(session.user_id().is_none());
        assert!(cache.lock().await.get(SESSION_PREFIX, "old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_session_is_discarded() {
        let cache = memory_cache().await;
        cache
            .lock()
            .await
            .put(
                SESSION_PREFIX,
                "bad",
                CacheData {
                    value: "not json".to_string(),
                },
            )
            .await
            .unwrap();

        let request = request_with_cookies(&[(SESSION_COOKIE_NAME.as_str(), "bad")]);
        let (id, session) = load_session(&cache, &request).await.unwrap();

        assert_eq!(id.as_deref(), Some("bad"));
        assert!(session.user_id().is_none());
        assert!(cache.lock().await.get(SESSION_PREFIX, "bad").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let cache = memory_cache().await;
        let session = AuthSession::with_user_id(UserId::new("u-1"));
        save_session(&cache, Some("sid"), &session).await.unwrap();

        delete_session(&cache, "sid").await.unwrap();
        assert!(cache.lock().await.get(SESSION_PREFIX, "sid").await.unwrap().is_none());
    }
}
