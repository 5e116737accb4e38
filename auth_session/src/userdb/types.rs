use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::gen_random_string;

use super::errors::UserError;
use super::password::hash_password;

/// Persisted identifier of a user record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Roles a user can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// A user record with username/password credentials and a re-authentication token
#[derive(Clone, FromRow, PartialEq)]
pub struct User {
    /// Unique user identifier (primary key)
    pub id: String,
    /// Login name
    pub username: String,
    /// PBKDF2 password hash
    pub password_hash: String,
    /// Token compared against the `AUTH` cookie
    pub auth_token: String,
    /// Whether the user has administrator privileges
    pub is_admin: bool,
    /// When the user account was created
    pub created_at: DateTime<Utc>,
    /// When the user account was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, not yet persisted, user with a hashed password and a fresh token
    pub fn new(username: &str, password: &str) -> Result<Self, UserError> {
        Self::with_password_hash(username, hash_password(password)?)
    }

    pub(crate) fn with_password_hash(
        username: &str,
        password_hash: String,
    ) -> Result<Self, UserError> {
        let now = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash,
            auth_token: gen_random_string(32)?,
            is_admin: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn user_id(&self) -> UserId {
        UserId::new(self.id.clone())
    }
}

// Credentials stay out of logs
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("auth_token", &"<redacted>")
            .field("is_admin", &self.is_admin)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}
