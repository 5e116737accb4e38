use std::fmt;

/// Lookup criterion for a single user record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCriteria {
    /// Match on the persisted identifier
    Id(String),
    /// Exact, case-sensitive username match
    Username(String),
    /// Case-insensitive username match
    UsernameIgnoreCase(String),
}

impl fmt::Display for UserCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserCriteria::Id(id) => write!(f, "id = {id}"),
            UserCriteria::Username(name) => write!(f, "username = {name}"),
            UserCriteria::UsernameIgnoreCase(name) => write!(f, "lower(username) = {name}"),
        }
    }
}

/// Turns a presented username into a lookup criterion.
///
/// Applications pick the builder that matches how usernames are stored;
/// the session layer never builds criteria on its own.
pub trait UserCriteriaBuilder: Send + Sync {
    fn build(&self, username: &str) -> UserCriteria;
}

/// Default builder: usernames compare byte-for-byte
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactUsername;

impl UserCriteriaBuilder for ExactUsername {
    fn build(&self, username: &str) -> UserCriteria {
        UserCriteria::Username(username.to_string())
    }
}

/// Usernames compare without regard to ASCII case
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitiveUsername;

impl UserCriteriaBuilder for CaseInsensitiveUsername {
    fn build(&self, username: &str) -> UserCriteria {
        UserCriteria::UsernameIgnoreCase(username.to_string())
    }
}
