use subtle::ConstantTimeEq;

use crate::session::errors::SessionError;
use crate::session::types::SessionState;
use crate::userdb::{AuthUser, UserId, UserRepository};

use super::context::AuthContext;
use super::cookie::{clear_sign_in_cookies, read_sign_in_cookies, write_sign_in_cookies};

/// Sign-in state of one visitor, plus the operations that change it.
///
/// Only the user identifier is ever held. The user record itself is
/// fetched again through the repository whenever it is needed, so a
/// session never operates on a stale copy.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    state: SessionState,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session already signed in as `user_id`, as restored from the session store
    pub fn with_user_id(user_id: UserId) -> Self {
        Self {
            state: SessionState::SignedIn(user_id),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Identifier held by the session, without any lookup or cookie attempt
    pub fn user_id(&self) -> Option<&UserId> {
        match &self.state {
            SessionState::SignedIn(id) => Some(id),
            _ => None,
        }
    }

    /// Whether the visitor is signed in, trying the remember-me cookies once per request
    pub async fn is_signed_in<R: UserRepository>(
        &mut self,
        ctx: &mut AuthContext<'_, R>,
    ) -> Result<bool, SessionError> {
        if self.state == SessionState::Unknown {
            if <R::User as AuthUser>::COOKIE_AUTH {
                self.cookie_sign_in(ctx).await?;
            }
            if self.state == SessionState::Unknown {
                self.state = SessionState::SignedOut;
            }
        }
        Ok(matches!(self.state, SessionState::SignedIn(_)))
    }

    /// Check a username and password against the stored user.
    ///
    /// Returns `Ok(false)` and leaves the session untouched when the user is
    /// unknown or the password does not match.
    #[tracing::instrument(skip(self, ctx, password))]
    pub async fn sign_in<R: UserRepository>(
        &mut self,
        ctx: &mut AuthContext<'_, R>,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<bool, SessionError> {
        let Some(user) = find_user(ctx, username).await? else {
            tracing::debug!("No user with this username");
            return Ok(false);
        };

        if !user.check_password(password) {
            tracing::debug!("Password mismatch");
            return Ok(false);
        }

        let user_id = ctx.users.identifier(&user);
        self.record_sign_in(ctx, user_id, remember_me).await?;
        Ok(true)
    }

    /// Sign in a user whose credentials were validated elsewhere.
    ///
    /// The user must already be persisted; otherwise `SessionError::NotPersisted`.
    pub async fn sign_in_user<R: UserRepository>(
        &mut self,
        ctx: &mut AuthContext<'_, R>,
        user: &R::User,
        remember_me: bool,
    ) -> Result<(), SessionError> {
        let user_id = ctx.users.identifier(user);
        if ctx.users.load(&user_id).await?.is_none() {
            return Err(SessionError::NotPersisted);
        }
        self.record_sign_in(ctx, user_id, remember_me).await
    }

    /// Forget the signed-in user and tell the browser to drop both remember-me cookies
    pub fn sign_out<R: UserRepository>(
        &mut self,
        ctx: &mut AuthContext<'_, R>,
    ) -> Result<(), SessionError> {
        if let SessionState::SignedIn(user_id) = &self.state {
            tracing::info!(user_id = %user_id, "User signed out");
        }
        self.state = SessionState::SignedOut;
        clear_sign_in_cookies(&mut ctx.response_headers)
    }

    /// Fresh copy of the signed-in user, or `None` when nobody is signed in.
    ///
    /// A held identifier whose record has disappeared signs the session out.
    pub async fn current_user<R: UserRepository>(
        &mut self,
        ctx: &mut AuthContext<'_, R>,
    ) -> Result<Option<R::User>, SessionError> {
        if !self.is_signed_in(ctx).await? {
            return Ok(None);
        }
        let Some(user_id) = self.user_id().cloned() else {
            return Ok(None);
        };

        match ctx.users.load(&user_id).await? {
            Some(user) => Ok(Some(user)),
            None => {
                tracing::warn!(user_id = %user_id, "Signed-in user no longer exists");
                self.state = SessionState::SignedOut;
                Ok(None)
            }
        }
    }

    /// Write the remember-me cookie pair for the signed-in user
    pub async fn set_cookie<R: UserRepository>(
        &mut self,
        ctx: &mut AuthContext<'_, R>,
    ) -> Result<(), SessionError> {
        let Some(user_id) = self.user_id().cloned() else {
            return Err(SessionError::NotSignedIn);
        };
        if !<R::User as AuthUser>::COOKIE_AUTH {
            return Err(SessionError::CookieAuthUnsupported);
        }

        let Some(user) = ctx.users.load(&user_id).await? else {
            tracing::warn!(user_id = %user_id, "Signed-in user no longer exists");
            self.state = SessionState::SignedOut;
            return Err(SessionError::NotSignedIn);
        };
        let cookie_user = user
            .cookie_auth()
            .ok_or(SessionError::CookieAuthUnsupported)?;

        let max_age = ctx.settings.cookie_max_age().num_seconds();
        write_sign_in_cookies(
            &mut ctx.response_headers,
            user.username(),
            cookie_user.token(),
            max_age,
        )?;

        tracing::debug!(user_id = %user_id, max_age, "Issued sign-in cookies");
        Ok(())
    }

    async fn cookie_sign_in<R: UserRepository>(
        &mut self,
        ctx: &mut AuthContext<'_, R>,
    ) -> Result<bool, SessionError> {
        let Some(cookies) = read_sign_in_cookies(ctx.request_headers) else {
            return Ok(false);
        };

        let Some(user) = find_user(ctx, &cookies.username).await? else {
            tracing::debug!("Sign-in cookie names an unknown user");
            return Ok(false);
        };

        let token_matches = match user.cookie_auth() {
            Some(cookie_user) => bool::from(
                cookie_user
                    .token()
                    .as_bytes()
                    .ct_eq(cookies.token.as_bytes()),
            ),
            None => false,
        };

        if !token_matches {
            tracing::debug!("Sign-in cookie token rejected");
            return Ok(false);
        }

        // The browser already holds valid cookies; do not issue new ones
        let user_id = ctx.users.identifier(&user);
        self.record_sign_in(ctx, user_id, false).await?;
        Ok(true)
    }

    async fn record_sign_in<R: UserRepository>(
        &mut self,
        ctx: &mut AuthContext<'_, R>,
        user_id: UserId,
        remember_me: bool,
    ) -> Result<(), SessionError> {
        tracing::info!(user_id = %user_id, "User signed in");
        self.state = SessionState::SignedIn(user_id);

        if remember_me {
            self.set_cookie(ctx).await?;
        }
        Ok(())
    }
}

async fn find_user<R: UserRepository>(
    ctx: &AuthContext<'_, R>,
    username: &str,
) -> Result<Option<R::User>, SessionError> {
    let criteria = ctx.settings.user_criteria(username);
    ctx.users.find_unique(&criteria).await.map_err(|e| {
        let err = SessionError::from(e);
        if let SessionError::AmbiguousUser(query) = &err {
            tracing::error!(query = %query, "Username lookup matched more than one user");
        }
        err
    })
}
