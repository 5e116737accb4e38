use async_trait::async_trait;

use super::criteria::UserCriteria;
use super::errors::UserError;
use super::password::verify_password;
use super::types::{Role, User, UserId};

/// Capability of user types that can re-authenticate through the `AUTH` cookie
pub trait CookieAuth: Send + Sync {
    /// The re-authentication token compared against the cookie value
    fn token(&self) -> &str;
}

/// What the session layer needs to know about a user record
pub trait AuthUser: Send + Sync {
    /// Whether records of this type can ever support cookie sign-in
    const COOKIE_AUTH: bool = false;

    fn username(&self) -> &str;

    fn check_password(&self, password: &str) -> bool;

    fn roles(&self) -> &[Role] {
        &[Role::User]
    }

    fn has_any_role(&self, roles: &[Role]) -> bool {
        self.roles().iter().any(|r| roles.contains(r))
    }

    /// Token access for this record, `None` when it cannot sign in by cookie
    fn cookie_auth(&self) -> Option<&dyn CookieAuth> {
        None
    }
}

/// Persistence collaborator used by the session layer
#[async_trait]
pub trait UserRepository: Send + Sync {
    type User: AuthUser;

    /// Zero or one record matching `criteria`; more than one is `UserError::NonUnique`
    async fn find_unique(&self, criteria: &UserCriteria) -> Result<Option<Self::User>, UserError>;

    /// Fetch a fresh copy of the record with the given identifier
    async fn load(&self, id: &UserId) -> Result<Option<Self::User>, UserError>;

    /// Primary key of a record
    fn identifier(&self, user: &Self::User) -> UserId;
}

impl CookieAuth for User {
    fn token(&self) -> &str {
        &self.auth_token
    }
}

impl AuthUser for User {
    const COOKIE_AUTH: bool = true;

    fn username(&self) -> &str {
        &self.username
    }

    fn check_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash)
    }

    fn roles(&self) -> &[Role] {
        if self.is_admin {
            &[Role::User, Role::Admin]
        } else {
            &[Role::User]
        }
    }

    fn cookie_auth(&self) -> Option<&dyn CookieAuth> {
        Some(self)
    }
}
